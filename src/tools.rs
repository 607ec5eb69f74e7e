//! External tool discovery.

use crate::constants::{FFMPEG, FFPROBE};
use crate::error::{CompressionError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `-version` output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Run `<program> -version` and report what came back.
///
/// ```no_run
/// use media_squeeze::tools::check_tool;
///
/// let info = check_tool("ffmpeg");
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(program: impl AsRef<Path>) -> ToolInfo {
    let program = program.as_ref();
    let name = program.display().to_string();
    let result = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.trim().to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check both tools the video path needs.
pub fn check_tools(ffmpeg: &Path, ffprobe: &Path) -> Vec<ToolInfo> {
    vec![check_tool(ffmpeg), check_tool(ffprobe)]
}

/// Require that a tool is available, returning its path.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| CompressionError::ToolNotFound(name.to_string()))
}

/// Resolve a tool, preferring a configured path over `PATH` lookup.
///
/// A configured path that doesn't exist is an error rather than a silent
/// fallback, so a typo in `--ffmpeg` is reported.
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => which::which(path)
            .map_err(|_| CompressionError::ToolNotFound(path.display().to_string())),
        None => require_tool(name),
    }
}

pub fn resolve_ffmpeg(configured: Option<&Path>) -> Result<PathBuf> {
    resolve_tool(FFMPEG, configured)
}

pub fn resolve_ffprobe(configured: Option<&Path>) -> Result<PathBuf> {
    resolve_tool(FFPROBE, configured)
}
