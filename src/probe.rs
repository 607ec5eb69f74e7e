//! Media duration probing via ffprobe.

use crate::constants::FFPROBE;
use crate::error::{CompressionError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Looks up how long a media file plays, without decoding it.
pub trait DurationProbe {
    /// Duration in seconds; always positive and finite on success.
    fn probe_duration(&self, path: &Path) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new(FFPROBE)
    }
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DurationProbe for Ffprobe {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        tracing::debug!(program = %self.program.display(), input = %path.display(), "probing duration");

        let output = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompressionError::probe(
                        path,
                        format!("{} not found", self.program.display()),
                    )
                } else {
                    CompressionError::probe(path, e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompressionError::probe(
                path,
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        parse_duration(path, &json)
    }
}

/// Extract `format.duration` from ffprobe's JSON output.
pub fn parse_duration(path: &Path, json: &str) -> Result<f64> {
    let parsed: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| CompressionError::probe(path, format!("unparsable probe output: {}", e)))?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| CompressionError::probe(path, "probe output has no duration"))?;

    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CompressionError::probe(path, format!("invalid duration: {}", raw)))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(CompressionError::probe(
            path,
            format!("invalid duration: {}", raw),
        ));
    }

    Ok(seconds)
}
