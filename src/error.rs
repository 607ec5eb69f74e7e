use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to analyze {}: {reason}", path.display())]
    ProbeFailure { path: PathBuf, reason: String },

    #[error("Failed to launch {tool}: {reason}")]
    ProcessLaunchFailure { tool: String, reason: String },

    #[error("Compression failed (exit code {}): {stderr}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ProcessNonZeroExit { code: Option<i32>, stderr: String },

    #[error("Compression cancelled")]
    CancelledByUser,

    #[error("Failed to open image {}: {reason}", path.display())]
    ImageDecodeFailure { path: PathBuf, reason: String },

    #[error("Failed to write image {}: {reason}", path.display())]
    ImageEncodeFailure { path: PathBuf, reason: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid output path {}: {reason}", path.display())]
    InvalidOutputPath { path: PathBuf, reason: String },

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

impl CompressionError {
    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn launch(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessLaunchFailure {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ImageDecodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ImageEncodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures a caller might fix by retrying with other parameters
    /// (as opposed to a broken input or missing tooling).
    pub fn is_process_failure(&self) -> bool {
        matches!(
            self,
            Self::ProcessLaunchFailure { .. } | Self::ProcessNonZeroExit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_and_process_failures_are_distinct() {
        let probe = CompressionError::probe("clip.mp4", "ffprobe not found");
        let exit = CompressionError::ProcessNonZeroExit {
            code: Some(1),
            stderr: "boom".to_string(),
        };
        assert!(!probe.is_process_failure());
        assert!(exit.is_process_failure());
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = CompressionError::probe("clip.mp4", "no duration");
        assert_eq!(err.to_string(), "Failed to analyze clip.mp4: no duration");

        let err = CompressionError::ProcessNonZeroExit {
            code: None,
            stderr: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "Compression failed (exit code none): killed");
    }
}
