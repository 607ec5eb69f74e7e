use crate::constants::COMPRESSED_SUFFIX;
use crate::error::{CompressionError, Result};
use crate::formats::ImageFormatChoice;
use crate::job::{default_image_output, CompressionJob};
use crate::processing::{ImageCodec, ImageCompressor};
use crate::utils::{calculate_compression_ratio, format_file_size, is_image_file};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub quality: i64,
    pub format: ImageFormatChoice,
    pub max_dimensions: Option<(u32, u32)>,
    /// Write outputs here instead of next to each input.
    pub output_dir: Option<PathBuf>,
    pub recursive: bool,
    pub threads: Option<usize>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub total_before: u64,
    pub total_after: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn reduction_percent(&self) -> f64 {
        calculate_compression_ratio(self.total_before, self.total_after)
    }

    pub fn print(&self) {
        crate::info!("\n📊 Batch Compression Summary:");
        crate::info!("  📁 Total files processed: {}", self.processed);
        crate::info!(
            "  📊 Total original size: {}",
            format_file_size(self.total_before)
        );
        crate::info!(
            "  📊 Total compressed size: {}",
            format_file_size(self.total_after)
        );
        crate::info!("  🎯 Overall reduction: {:.1}%", self.reduction_percent());
        crate::info!("  ⏱️  Total time: {:.2?}", self.elapsed);
        if !self.failed.is_empty() {
            crate::warn!("Failed files: {}", self.failed.len());
            for (path, reason) in &self.failed {
                crate::error!("{}: {}", path.display(), reason);
            }
        }
    }
}

/// Compress every image matched by `input` in parallel.
///
/// Per-file failures are collected in the summary rather than aborting the
/// batch.
pub fn batch_compress_images<C>(
    compressor: &ImageCompressor<C>,
    input: &str,
    options: &BatchOptions,
) -> Result<BatchSummary>
where
    C: ImageCodec + Sync,
{
    let start_time = Instant::now();

    let image_files = collect_image_files(input, options.recursive)?;
    let total_files = image_files.len();

    if total_files == 0 {
        crate::warn!("No image files found in the input path");
        return Ok(BatchSummary::default());
    }

    crate::info!("📊 Found {} image files to process", total_files);

    if let Some(dir) = &options.output_dir {
        fs::create_dir_all(dir).map_err(|e| CompressionError::InvalidOutputPath {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
    }

    let threads = options
        .threads
        .unwrap_or_else(num_cpus::get)
        .clamp(1, total_files);
    crate::verbose!("Using {} parallel threads for processing", threads);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| CompressionError::Io(std::io::Error::other(e)))?;

    let progress = if crate::logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total_files as u64)
    };
    progress.set_style(ProgressStyle::default_bar());

    let total_before = AtomicU64::new(0);
    let total_after = AtomicU64::new(0);

    let results: Vec<(PathBuf, Result<()>)> = pool.install(|| {
        image_files
            .par_iter()
            .map(|input_path| {
                let output = generate_output_path(
                    input_path,
                    options.output_dir.as_deref(),
                    options.format,
                );
                let job = CompressionJob::image(input_path, options.quality, options.format)
                    .with_output(output)
                    .with_max_dimensions(options.max_dimensions);

                let result = compressor.compress(&job, &mut |_| {}).map(|report| {
                    total_before.fetch_add(report.original_bytes, Ordering::Relaxed);
                    total_after.fetch_add(report.compressed_bytes, Ordering::Relaxed);
                });
                progress.inc(1);
                (input_path.clone(), result)
            })
            .collect()
    });

    progress.finish_and_clear();

    let mut summary = BatchSummary {
        total_before: total_before.load(Ordering::Relaxed),
        total_after: total_after.load(Ordering::Relaxed),
        elapsed: start_time.elapsed(),
        ..BatchSummary::default()
    };
    for (path, result) in results {
        match result {
            Ok(()) => summary.processed += 1,
            Err(e) => summary.failed.push((path, e.to_string())),
        }
    }

    Ok(summary)
}

/// Expand a file, directory, or glob pattern into image paths.
///
/// Files already carrying the `_compressed` suffix are skipped so re-running
/// over the same folder doesn't compress outputs again.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) && !is_compressed_output(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else {
        let pattern =
            glob(input).map_err(|_| CompressionError::NoImageFilesFound(input.to_string()))?;
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) && !is_compressed_output(&entry) {
                image_files.push(entry);
            }
        }
    }

    Ok(image_files)
}

fn is_compressed_output(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().ends_with(COMPRESSED_SUFFIX))
        .unwrap_or(false)
}

pub fn generate_output_path(
    input_path: &Path,
    output_dir: Option<&Path>,
    format: ImageFormatChoice,
) -> PathBuf {
    let beside_input = default_image_output(input_path, format);
    match (output_dir, beside_input.file_name()) {
        (Some(dir), Some(file_name)) => dir.join(file_name),
        _ => beside_input,
    }
}
