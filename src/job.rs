//! Compression jobs, their events and outcomes.

use crate::constants::{COMPRESSED_SUFFIX, DEFAULT_PRESET, MAX_QUALITY, MIN_QUALITY};
use crate::error::{CompressionError, Result};
use crate::formats::ImageFormatChoice;
use crate::utils::{calculate_compression_ratio, format_file_size, is_image_file, is_video_file};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Classify by extension.
    pub fn detect(path: &Path) -> Option<Self> {
        if is_video_file(path) {
            Some(MediaKind::Video)
        } else if is_image_file(path) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

/// What the user dialled in: a size for video, a quality for images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    SizeMb(f64),
    QualityPercent(u8),
}

/// Clamp an image quality into the accepted range instead of rejecting it.
pub fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(MIN_QUALITY as i64, MAX_QUALITY as i64) as u8
}

/// A single compression request. Runners only ever borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: Target,
    pub preset: String,
    pub kind: MediaKind,
    /// Images only: shrink to fit inside this box.
    pub max_dimensions: Option<(u32, u32)>,
}

impl CompressionJob {
    pub fn video(input: impl Into<PathBuf>, target_mb: f64, preset: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            output: default_video_output(&input),
            input,
            target: Target::SizeMb(target_mb),
            preset: preset.into(),
            kind: MediaKind::Video,
            max_dimensions: None,
        }
    }

    pub fn image(input: impl Into<PathBuf>, quality: i64, format: ImageFormatChoice) -> Self {
        let input = input.into();
        Self {
            output: default_image_output(&input, format),
            input,
            target: Target::QualityPercent(clamp_quality(quality)),
            preset: String::new(),
            kind: MediaKind::Image,
            max_dimensions: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_max_dimensions(mut self, max_dimensions: Option<(u32, u32)>) -> Self {
        self.max_dimensions = max_dimensions;
        self
    }

    /// Target size in MB, for video jobs.
    pub fn target_mb(&self) -> Result<f64> {
        match self.target {
            Target::SizeMb(mb) => Ok(mb),
            Target::QualityPercent(_) => Err(CompressionError::InvalidTarget(
                "video jobs need a target size in MB".to_string(),
            )),
        }
    }

    /// Quality for image jobs, always within [10, 100].
    pub fn quality(&self) -> u8 {
        match self.target {
            Target::QualityPercent(q) => clamp_quality(q as i64),
            // A size dial doubles as the quality percentage.
            Target::SizeMb(mb) => clamp_quality(mb as i64),
        }
    }

    pub fn preset_label(&self) -> &str {
        if self.preset.is_empty() {
            DEFAULT_PRESET
        } else {
            &self.preset
        }
    }
}

fn compressed_name(input: &Path, extension: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match extension {
        Some(ext) if !ext.is_empty() => format!("{}{}.{}", stem, COMPRESSED_SUFFIX, ext),
        _ => format!("{}{}", stem, COMPRESSED_SUFFIX),
    };
    input.with_file_name(file_name)
}

/// `<stem>_compressed<suffix>` next to the input.
pub fn default_video_output(input: &Path) -> PathBuf {
    compressed_name(input, input.extension().and_then(|e| e.to_str()))
}

/// Same pattern as video, with the extension taken from the format choice.
pub fn default_image_output(input: &Path, format: ImageFormatChoice) -> PathBuf {
    let extension = format.output_extension(input);
    compressed_name(input, extension.as_deref())
}

/// Original and compressed file sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl SizeReport {
    pub fn reduction_percent(&self) -> f64 {
        calculate_compression_ratio(self.original_bytes, self.compressed_bytes)
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Original: {}\nCompressed: {}\nReduction: {:.1}%",
            format_file_size(self.original_bytes),
            format_file_size(self.compressed_bytes),
            self.reduction_percent()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Probing,
    Encoding,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    State(JobState),
    Status(String),
    Progress(u8),
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed {
        message: String,
        output: PathBuf,
        report: Option<SizeReport>,
    },
    Cancelled,
    Failed(CompressionError),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Completed { .. } => JobState::Completed,
            JobOutcome::Cancelled => JobState::Cancelled,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }

    /// The `(success, message)` pair handed to UI callers.
    pub fn summary(&self) -> (bool, String) {
        match self {
            JobOutcome::Completed { message, .. } => (true, message.clone()),
            JobOutcome::Cancelled => (false, CompressionError::CancelledByUser.to_string()),
            JobOutcome::Failed(err) => (false, err.to_string()),
        }
    }
}

/// Per-job cancellation flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_video_output() {
        assert_eq!(
            default_video_output(Path::new("/videos/holiday.mp4")),
            PathBuf::from("/videos/holiday_compressed.mp4")
        );
        assert_eq!(
            default_video_output(Path::new("clip")),
            PathBuf::from("clip_compressed")
        );
    }

    #[test]
    fn test_default_image_output_follows_format_choice() {
        let input = Path::new("/pics/cat.png");
        assert_eq!(
            default_image_output(input, ImageFormatChoice::Jpeg),
            PathBuf::from("/pics/cat_compressed.jpg")
        );
        assert_eq!(
            default_image_output(input, ImageFormatChoice::Png),
            PathBuf::from("/pics/cat_compressed.png")
        );
        assert_eq!(
            default_image_output(Path::new("/pics/cat.bmp"), ImageFormatChoice::KeepOriginal),
            PathBuf::from("/pics/cat_compressed.bmp")
        );
    }

    #[test]
    fn test_clamp_quality() {
        assert_eq!(clamp_quality(-5), 10);
        assert_eq!(clamp_quality(0), 10);
        assert_eq!(clamp_quality(55), 55);
        assert_eq!(clamp_quality(250), 100);
    }

    #[test]
    fn test_image_job_clamps_quality() {
        let job = CompressionJob::image("a.png", 400, ImageFormatChoice::Jpeg);
        assert_eq!(job.target, Target::QualityPercent(100));
        assert_eq!(job.quality(), 100);
        assert_eq!(job.kind, MediaKind::Image);
    }

    #[test]
    fn test_video_job_defaults() {
        let job = CompressionJob::video("a.mov", 25.0, "");
        assert_eq!(job.output, PathBuf::from("a_compressed.mov"));
        assert_eq!(job.target_mb().unwrap(), 25.0);
        assert_eq!(job.preset_label(), "Medium");

        let job = job.with_output("/tmp/out.mp4");
        assert_eq!(job.output, PathBuf::from("/tmp/out.mp4"));
    }

    #[test]
    fn test_target_mb_rejects_quality_target() {
        let job = CompressionJob::image("a.png", 80, ImageFormatChoice::Png);
        assert!(matches!(
            job.target_mb(),
            Err(CompressionError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_media_kind_detect() {
        assert_eq!(MediaKind::detect(Path::new("a.MP4")), Some(MediaKind::Video));
        assert_eq!(MediaKind::detect(Path::new("a.jpeg")), Some(MediaKind::Image));
        assert_eq!(MediaKind::detect(Path::new("a.txt")), None);
    }

    #[test]
    fn test_size_report_allows_negative_reduction() {
        let report = SizeReport {
            original_bytes: 1000,
            compressed_bytes: 1500,
        };
        assert_eq!(report.reduction_percent(), -50.0);
        assert!(report.to_string().contains("Reduction: -50.0%"));
    }

    #[test]
    fn test_outcome_summary() {
        let done = JobOutcome::Completed {
            message: "ok".to_string(),
            output: PathBuf::from("out.mp4"),
            report: None,
        };
        assert_eq!(done.summary(), (true, "ok".to_string()));
        assert_eq!(done.state(), JobState::Completed);

        let cancelled = JobOutcome::Cancelled;
        assert_eq!(
            cancelled.summary(),
            (false, "Compression cancelled".to_string())
        );
        assert!(cancelled.state().is_terminal());
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
