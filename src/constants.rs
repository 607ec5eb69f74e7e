pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 10;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_TARGET_MB: f64 = 100.0;
pub const DEFAULT_PRESET: &str = "Medium";

// Bitrate planning
pub const AUDIO_BITRATE_KBPS: u32 = 128;
pub const AUDIO_BITS_PER_SECOND: f64 = 128_000.0;
pub const MIN_VIDEO_BITRATE_KBPS: u32 = 100;
pub const BITS_PER_MEGABYTE: f64 = 8.0 * 1024.0 * 1024.0;

// Encoder invocation
pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";
pub const FFMPEG_ENV: &str = "MEDIA_SQUEEZE_FFMPEG";
pub const FFPROBE_ENV: &str = "MEDIA_SQUEEZE_FFPROBE";

// Encode polling
pub const POLL_INTERVAL_MS: u64 = 500;
pub const PROGRESS_STEP: u8 = 2;
pub const PROGRESS_CAP: u8 = 95;
pub const PROGRESS_DONE: u8 = 100;
/// Tail of encoder stderr kept for error messages.
pub const STDERR_TAIL_BYTES: usize = 16 * 1024;

pub const COMPRESSED_SUFFIX: &str = "_compressed";

pub const PNG_OPTIMIZATION_PRESET: u8 = 4;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif", "webp"];

pub const PROGRESS_BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
