use crate::constants::{DEFAULT_PRESET, DEFAULT_QUALITY, DEFAULT_TARGET_MB, FFMPEG_ENV, FFPROBE_ENV};
use crate::formats::ImageFormatChoice;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "media-squeeze",
    about = "Shrink videos to a target size and recompress images",
    long_about = "media-squeeze compresses videos with ffmpeg to fit a target file size, \
                  and recompresses images to JPEG or optimized PNG. \
                  Transparent images are flattened onto a white background.",
    version,
    after_help = "EXAMPLES:\n  \
    media-squeeze video clip.mp4 -t 50 -p Slow\n  \
    media-squeeze image photo.png -q 75 -f jpeg\n  \
    media-squeeze batch ./photos -o ./compressed -r -q 70\n  \
    media-squeeze info clip.mp4 -t 25"
)]
pub struct Args {
    #[arg(long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "Show detailed diagnostic output")]
    pub verbose: bool,

    #[command(flatten)]
    pub tools: ToolArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Locations of the external encoder tools.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ToolArgs {
    #[arg(
        long,
        global = true,
        env = FFMPEG_ENV,
        value_name = "PATH",
        help = "ffmpeg executable (default: found on PATH)"
    )]
    pub ffmpeg: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = FFPROBE_ENV,
        value_name = "PATH",
        help = "ffprobe executable (default: found on PATH)"
    )]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a video to a target file size",
        long_about = "Probe the video's duration, derive a bitrate that fits the target size \
                      with a 128 kbps AAC track, and re-encode with libx264."
    )]
    Video {
        #[arg(help = "Input video file path")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path (default: <name>_compressed.<ext> next to the input)"
        )]
        output: Option<PathBuf>,

        #[arg(
            short,
            long,
            default_value_t = DEFAULT_TARGET_MB,
            help = "Target size in MB",
            long_help = "Target output size in megabytes. The video bitrate never drops below \
                         100 kbps, so very small targets for long clips are exceeded."
        )]
        target: f64,

        #[arg(
            short,
            long,
            default_value = DEFAULT_PRESET,
            help = "Encoder speed preset",
            long_help = "Encoder speed preset, from 'Ultra Fast' to 'Very Slow'. \
                         Unknown names fall back to Medium. Run `presets` to list them."
        )]
        preset: String,

        #[arg(
            long,
            help = "Report progress from the encoder's own position",
            long_help = "Drive the progress bar from the encoded position reported by ffmpeg \
                         instead of the fixed-step estimate."
        )]
        measured_progress: bool,
    },

    #[command(
        about = "Compress a single image",
        long_about = "Recompress an image as JPEG or optimized PNG. The codec follows the \
                      output extension; transparency is flattened onto white."
    )]
    Image {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(short, long, help = "Output file path")]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: ImageSettings,
    },

    #[command(
        about = "Compress many images in parallel",
        long_about = "Process images in parallel. Input can be a single file, a directory, \
                      or a glob pattern such as './photos/*.png'."
    )]
    Batch {
        #[arg(help = "Input directory, file, or glob pattern")]
        input: String,

        #[arg(
            short,
            long,
            help = "Output directory (default: next to each input)"
        )]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: ImageSettings,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)"
        )]
        threads: Option<usize>,

        #[arg(short, long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(
        about = "Show information about a video or image",
        long_about = "For videos, show the duration and the bitrate plan for a target size. \
                      For images, show dimensions and color type."
    )]
    Info {
        #[arg(help = "Input file path")]
        input: PathBuf,

        #[arg(
            short,
            long,
            default_value_t = DEFAULT_TARGET_MB,
            help = "Target size in MB used for the bitrate plan"
        )]
        target: f64,
    },

    #[command(about = "List encoder presets")]
    Presets,

    #[command(about = "Check that ffmpeg and ffprobe are available")]
    Tools,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ImageSettings {
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_QUALITY as i64,
        allow_negative_numbers = true,
        help = "JPEG quality (clamped to 10-100)",
        long_help = "JPEG quality. Values outside 10-100 are clamped. \
                     PNG output is lossless and ignores this setting."
    )]
    pub quality: i64,

    #[arg(
        short,
        long,
        default_value = "jpeg",
        help = "Output format: jpeg, png or keep",
        long_help = "Output format for the default output name. 'keep' keeps the input's \
                     extension. An explicit output path's extension always wins."
    )]
    pub format: ImageFormatChoice,

    #[arg(short = 'w', long, help = "Maximum width in pixels")]
    pub max_width: Option<u32>,

    #[arg(short = 'H', long, help = "Maximum height in pixels")]
    pub max_height: Option<u32>,
}

impl ImageSettings {
    /// Resize box, if either bound was given. A missing bound is unlimited.
    pub fn max_dimensions(&self) -> Option<(u32, u32)> {
        match (self.max_width, self.max_height) {
            (None, None) => None,
            (w, h) => Some((w.unwrap_or(u32::MAX), h.unwrap_or(u32::MAX))),
        }
    }
}
