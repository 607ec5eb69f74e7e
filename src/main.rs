use anyhow::{bail, Context, Result};
use clap::Parser;
use media_squeeze::batch::{batch_compress_images, BatchOptions};
use media_squeeze::cli::{Args, Commands, ImageSettings, ToolArgs};
use media_squeeze::constants::{FFMPEG, FFPROBE};
use media_squeeze::info::{inspect, print_media_info};
use media_squeeze::preset::PRESET_TABLE;
use media_squeeze::tools::{check_tools, resolve_ffmpeg, resolve_ffprobe};
use media_squeeze::utils::{create_percent_bar, create_progress_spinner};
use media_squeeze::validation::validate_input_path;
use media_squeeze::{
    logger, spawn_job, CompressionJob, Compressor, EncoderPreset, Ffmpeg, Ffprobe,
    ImageCompressor, JobEvent, ProgressMode, StandardImageCodec, VideoCompressor,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Video {
            input,
            output,
            target,
            preset,
            measured_progress,
        } => compress_video(&args.tools, input, output, target, preset, measured_progress),
        Commands::Image {
            input,
            output,
            settings,
        } => compress_image(input, output, &settings),
        Commands::Batch {
            input,
            output,
            settings,
            threads,
            recursive,
        } => compress_batch(&input, output, &settings, threads, recursive),
        Commands::Info { input, target } => show_info(&args.tools, &input, target),
        Commands::Presets => {
            list_presets();
            Ok(())
        }
        Commands::Tools => show_tools(&args.tools),
    }
}

fn compress_video(
    tools: &ToolArgs,
    input: PathBuf,
    output: Option<PathBuf>,
    target_mb: f64,
    preset: String,
    measured_progress: bool,
) -> Result<()> {
    validate_input_path(&input)?;
    if preset.parse::<EncoderPreset>().is_err() {
        media_squeeze::warn!("Unknown preset '{}', using Medium", preset);
    }

    let ffmpeg = resolve_ffmpeg(tools.ffmpeg.as_deref())?;
    let ffprobe = resolve_ffprobe(tools.ffprobe.as_deref())?;
    media_squeeze::verbose!("Using ffmpeg at {}", ffmpeg.display());
    media_squeeze::verbose!("Using ffprobe at {}", ffprobe.display());

    let progress_mode = if measured_progress {
        ProgressMode::Measured
    } else {
        ProgressMode::Synthetic
    };
    let compressor = Compressor::new(
        VideoCompressor::new(Ffprobe::new(ffprobe), Ffmpeg::new(ffmpeg))
            .with_progress_mode(progress_mode),
        ImageCompressor::default(),
    );

    let mut job = CompressionJob::video(&input, target_mb, preset);
    if let Some(output) = output {
        job = job.with_output(output);
    }

    media_squeeze::info!("🎬 Compressing video: {}", input.display());
    run_job(compressor, job)
}

fn compress_image(input: PathBuf, output: Option<PathBuf>, settings: &ImageSettings) -> Result<()> {
    validate_input_path(&input)?;

    let mut job = CompressionJob::image(&input, settings.quality, settings.format)
        .with_max_dimensions(settings.max_dimensions());
    if let Some(output) = output {
        job = job.with_output(output);
    }

    media_squeeze::info!("🖼️  Compressing image: {}", input.display());
    // Image jobs never touch the video tools.
    let compressor = Compressor::with_tools(Ffprobe::default(), Ffmpeg::default());
    run_job(compressor, job)
}

/// Run a job on a worker thread, driving a progress bar from its events.
fn run_job(compressor: Compressor, job: CompressionJob) -> Result<()> {
    let handle = spawn_job(Arc::new(compressor), job);

    let bar = if logger::is_quiet() {
        indicatif::ProgressBar::hidden()
    } else {
        create_percent_bar()
    };
    for event in handle.events() {
        match event {
            JobEvent::Progress(percent) => bar.set_position(percent as u64),
            JobEvent::Status(status) => bar.set_message(status),
            JobEvent::State(state) => tracing::debug!(?state, "job state changed"),
        }
    }
    bar.finish_and_clear();

    let (success, message) = handle.wait().summary();
    if !success {
        bail!(message);
    }
    media_squeeze::info!("✅ {}", message);
    Ok(())
}

fn compress_batch(
    input: &str,
    output_dir: Option<PathBuf>,
    settings: &ImageSettings,
    threads: Option<usize>,
    recursive: bool,
) -> Result<()> {
    let options = BatchOptions {
        quality: settings.quality,
        format: settings.format,
        max_dimensions: settings.max_dimensions(),
        output_dir,
        recursive,
        threads,
    };

    let compressor = ImageCompressor::new(StandardImageCodec::default());
    let summary = batch_compress_images(&compressor, input, &options)
        .with_context(|| format!("batch compression of '{}' failed", input))?;
    summary.print();

    if !summary.failed.is_empty() {
        bail!(
            "{} of {} files failed to compress",
            summary.failed.len(),
            summary.failed.len() + summary.processed
        );
    }
    Ok(())
}

fn show_info(tools: &ToolArgs, input: &Path, target_mb: f64) -> Result<()> {
    media_squeeze::info!("📊 Analyzing: {}", input.display());

    // Resolved lazily: image info must work without ffprobe installed.
    let ffprobe = tools
        .ffprobe
        .clone()
        .unwrap_or_else(|| PathBuf::from(FFPROBE));
    let spinner = if logger::is_quiet() {
        indicatif::ProgressBar::hidden()
    } else {
        create_progress_spinner("Inspecting...")
    };
    let info = inspect(input, target_mb, &Ffprobe::new(ffprobe));
    spinner.finish_and_clear();
    print_media_info(input, &info?);
    Ok(())
}

fn list_presets() {
    media_squeeze::info!("🎛️  Encoder presets (fastest to slowest):");
    for (label, preset) in PRESET_TABLE {
        let marker = if *preset == EncoderPreset::default() {
            " (default)"
        } else {
            ""
        };
        media_squeeze::info!("  {:<12} -preset {}{}", label, preset.as_ffmpeg(), marker);
    }
}

fn show_tools(tools: &ToolArgs) -> Result<()> {
    let ffmpeg = tools.ffmpeg.clone().unwrap_or_else(|| PathBuf::from(FFMPEG));
    let ffprobe = tools
        .ffprobe
        .clone()
        .unwrap_or_else(|| PathBuf::from(FFPROBE));

    let mut missing = Vec::new();
    for tool in check_tools(&ffmpeg, &ffprobe) {
        if tool.available {
            media_squeeze::info!(
                "✅ {}: {}",
                tool.name,
                tool.version.as_deref().unwrap_or("unknown version")
            );
            if let Some(path) = &tool.path {
                media_squeeze::verbose!("{} found at {}", tool.name, path.display());
            }
        } else {
            media_squeeze::error!("{}: not found", tool.name);
            missing.push(tool.name);
        }
    }

    if !missing.is_empty() {
        bail!(
            "missing tools: {}. Video compression needs ffmpeg and ffprobe.",
            missing.join(", ")
        );
    }
    Ok(())
}
