use crate::constants::PNG_OPTIMIZATION_PRESET;
use crate::error::{CompressionError, Result};
use crate::formats::OutputCodec;
use crate::job::{CompressionJob, JobEvent, JobOutcome, JobState, SizeReport};
use crate::validation::{ensure_distinct_output, prepare_output_path};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

/// Decode and encode operations the image runner needs.
pub trait ImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage>;

    /// Encode `image` with `codec` and write it to `output`.
    ///
    /// `quality` is only meaningful for JPEG.
    fn save(&self, image: &RgbImage, output: &Path, codec: OutputCodec, quality: u8)
        -> Result<()>;
}

/// `image` crate codecs, with PNG output passed through oxipng.
#[derive(Debug, Clone)]
pub struct StandardImageCodec {
    pub optimize: bool,
}

impl Default for StandardImageCodec {
    fn default() -> Self {
        Self { optimize: true }
    }
}

impl ImageCodec for StandardImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| CompressionError::decode(path, e))?;
        reader.decode().map_err(|e| CompressionError::decode(path, e))
    }

    fn save(
        &self,
        image: &RgbImage,
        output: &Path,
        codec: OutputCodec,
        quality: u8,
    ) -> Result<()> {
        let mut encoded = Vec::new();
        match codec {
            OutputCodec::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| CompressionError::encode(output, e))?;
            }
            OutputCodec::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut encoded,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| CompressionError::encode(output, e))?;

                if self.optimize {
                    let options = oxipng::Options::from_preset(PNG_OPTIMIZATION_PRESET);
                    encoded = oxipng::optimize_from_memory(&encoded, &options)
                        .map_err(|e| CompressionError::encode(output, e))?;
                }
            }
        }

        fs::write(output, &encoded).map_err(|e| CompressionError::encode(output, e))
    }
}

/// Convert any color mode to 8-bit RGB.
///
/// Modes with an alpha channel are composited onto white first, so
/// transparent areas come out white rather than black.
pub fn normalize_color(image: DynamicImage) -> RgbImage {
    if image.color().has_alpha() {
        flatten_onto_white(&image.to_rgba8())
    } else {
        image.into_rgb8()
    }
}

pub fn flatten_onto_white(rgba: &RgbaImage) -> RgbImage {
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Largest size with the same aspect ratio that fits inside the box.
/// Never enlarges.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let fitted_h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (fitted_w, fitted_h)
}

pub fn resize_image(image: RgbImage, max_dimensions: Option<(u32, u32)>) -> RgbImage {
    let Some((max_width, max_height)) = max_dimensions else {
        return image;
    };
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_dimensions(width, height, max_width, max_height);
    if (new_width, new_height) == (width, height) {
        return image;
    }
    tracing::debug!(width, height, new_width, new_height, "resizing image");
    image::imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Image compression runner. Synchronous; no cancellation.
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor<C = StandardImageCodec> {
    codec: C,
}

impl<C: ImageCodec> ImageCompressor<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Run a job to a terminal outcome, reporting progress through `on_event`.
    pub fn run(&self, job: &CompressionJob, on_event: &mut dyn FnMut(JobEvent)) -> JobOutcome {
        on_event(JobEvent::State(JobState::Idle));
        on_event(JobEvent::State(JobState::Encoding));
        let outcome = match self.compress(job, on_event) {
            Ok(report) => {
                on_event(JobEvent::Progress(100));
                on_event(JobEvent::Status("Image compression completed!".to_string()));
                JobOutcome::Completed {
                    message: format!(
                        "Image compressed successfully!\n{}\nSaved to: {}",
                        report,
                        job.output.display()
                    ),
                    output: job.output.clone(),
                    report: Some(report),
                }
            }
            Err(err) => {
                tracing::debug!(input = %job.input.display(), error = %err, "image job failed");
                JobOutcome::Failed(err)
            }
        };
        on_event(JobEvent::State(outcome.state()));
        outcome
    }

    /// Decode, normalize, optionally shrink, encode, and measure.
    pub fn compress(
        &self,
        job: &CompressionJob,
        on_event: &mut dyn FnMut(JobEvent),
    ) -> Result<SizeReport> {
        ensure_distinct_output(&job.input, &job.output)?;

        on_event(JobEvent::Status("Loading image...".to_string()));
        on_event(JobEvent::Progress(10));
        let decoded = self.codec.decode(&job.input)?;

        on_event(JobEvent::Status("Processing image...".to_string()));
        on_event(JobEvent::Progress(30));
        let rgb = resize_image(normalize_color(decoded), job.max_dimensions);
        on_event(JobEvent::Progress(50));

        let codec = OutputCodec::from_output_path(&job.output);
        let quality = job.quality();
        if codec.uses_quality() {
            on_event(JobEvent::Status(format!(
                "Saving compressed image (quality: {}%)...",
                quality
            )));
        } else {
            on_event(JobEvent::Status(
                "Saving compressed image (lossless)...".to_string(),
            ));
        }
        on_event(JobEvent::Progress(80));

        prepare_output_path(&job.output)?;
        self.codec.save(&rgb, &job.output, codec, quality)?;

        let original_bytes = fs::metadata(&job.input)?.len();
        let compressed_bytes = fs::metadata(&job.output)?.len();
        Ok(SizeReport {
            original_bytes,
            compressed_bytes,
        })
    }
}
