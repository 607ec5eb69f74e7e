//! Video and image compression.
//!
//! Videos are re-encoded with ffmpeg at a bitrate derived from a target file
//! size; images are recompressed to JPEG or optimized PNG. Both run through a
//! [`CompressionJob`] and report [`JobEvent`]s until a terminal [`JobOutcome`].

pub mod batch;
pub mod bitrate;
pub mod cli;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod formats;
pub mod info;
pub mod logger;
pub mod job;
pub mod preset;
pub mod probe;
pub mod processing;
pub mod tools;
pub mod utils;
pub mod validation;
pub mod video;
pub mod worker;

pub use batch::{batch_compress_images, collect_image_files, BatchOptions, BatchSummary};
pub use bitrate::{bitrate_kbps, BitratePlan};
pub use encoder::{EncodeExit, EncodeProcess, EncodeRequest, Encoder, Ffmpeg};
pub use error::{CompressionError, Result};
pub use formats::{ImageFormatChoice, OutputCodec};
pub use info::{inspect, MediaInfo};
pub use job::{
    CancelToken, CompressionJob, JobEvent, JobOutcome, JobState, MediaKind, SizeReport, Target,
};
pub use preset::EncoderPreset;
pub use probe::{DurationProbe, Ffprobe};
pub use processing::{ImageCodec, ImageCompressor, StandardImageCodec};
pub use video::{ProgressMode, VideoCompressor};
pub use worker::{spawn_job, Compressor, JobHandle};
