use crate::bitrate::BitratePlan;
use crate::error::{CompressionError, Result};
use crate::job::MediaKind;
use crate::probe::DurationProbe;
use crate::utils::format_file_size;
use image::{ColorType, ImageReader};
use std::fs;
use std::path::Path;

/// What `info` reports about a file.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInfo {
    Video {
        size_bytes: u64,
        duration_s: f64,
        plan: BitratePlan,
    },
    Image {
        size_bytes: u64,
        width: u32,
        height: u32,
        color: ColorType,
        format: Option<image::ImageFormat>,
    },
}

/// Inspect a file without modifying it.
///
/// Videos are probed for duration and planned against `target_mb`; images
/// are decoded for their dimensions and color type.
pub fn inspect(path: &Path, target_mb: f64, prober: &impl DurationProbe) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }
    let size_bytes = fs::metadata(path)?.len();

    match MediaKind::detect(path) {
        Some(MediaKind::Video) => {
            let duration_s = prober.probe_duration(path)?;
            let plan = BitratePlan::new(duration_s, target_mb)?;
            Ok(MediaInfo::Video {
                size_bytes,
                duration_s,
                plan,
            })
        }
        Some(MediaKind::Image) => image_info(path, size_bytes),
        None => Err(CompressionError::UnsupportedFormat(format!(
            "{} is neither a supported video nor image",
            path.display()
        ))),
    }
}

fn image_info(path: &Path, size_bytes: u64) -> Result<MediaInfo> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| CompressionError::decode(path, e))?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| CompressionError::decode(path, e))?;

    Ok(MediaInfo::Image {
        size_bytes,
        width: img.width(),
        height: img.height(),
        color: img.color(),
        format,
    })
}

pub fn print_media_info(path: &Path, info: &MediaInfo) {
    crate::info!("📋 Basic Information:");
    crate::info!("  📁 File: {}", path.display());
    match info {
        MediaInfo::Video {
            size_bytes,
            duration_s,
            plan,
        } => {
            crate::info!("  📦 File size: {}", format_file_size(*size_bytes));
            crate::info!("  ⏱️  Duration: {:.2} s", duration_s);
            crate::info!("\n🎯 Plan for {:.1} MB:", plan.target_mb);
            crate::info!("  🎬 Video bitrate: {} kbps", plan.video_kbps);
            crate::info!("  🔊 Audio bitrate: {} kbps", plan.audio_kbps);
            crate::info!(
                "  📊 Estimated output: {}",
                format_file_size(plan.estimated_bytes())
            );
            if plan.overshoots_target() {
                crate::warn!(
                    "Target is too small for this duration; output will exceed {:.1} MB",
                    plan.target_mb
                );
            }
        }
        MediaInfo::Image {
            size_bytes,
            width,
            height,
            color,
            format,
        } => {
            crate::info!("  📏 Dimensions: {}x{} pixels", width, height);
            crate::info!("  📦 File size: {}", format_file_size(*size_bytes));
            crate::info!("  🎨 Color type: {:?}", color);
            crate::info!("  🎭 Image format: {:?}", format);
            if color.has_alpha() {
                crate::info!("\n💡 Transparency is flattened onto white when compressing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct FixedDuration(f64);

    impl DurationProbe for FixedDuration {
        fn probe_duration(&self, _path: &Path) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_inspect_missing_file() {
        let result = inspect(Path::new("missing.mp4"), 50.0, &FixedDuration(10.0));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_inspect_video_plans_bitrate() {
        let temp_dir = TempDir::new().unwrap();
        let clip: PathBuf = temp_dir.path().join("clip.mp4");
        fs::write(&clip, b"not really a video").unwrap();

        match inspect(&clip, 50.0, &FixedDuration(120.0)).unwrap() {
            MediaInfo::Video {
                size_bytes,
                duration_s,
                plan,
            } => {
                assert_eq!(size_bytes, 18);
                assert_eq!(duration_s, 120.0);
                assert_eq!(plan.video_kbps, 3367);
            }
            other => panic!("expected video info, got {:?}", other),
        }
    }

    #[test]
    fn test_inspect_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logo.png");
        RgbaImage::from_pixel(6, 4, Rgba([0, 0, 0, 0]))
            .save(&path)
            .unwrap();

        match inspect(&path, 50.0, &FixedDuration(1.0)).unwrap() {
            MediaInfo::Image {
                width,
                height,
                color,
                format,
                ..
            } => {
                assert_eq!((width, height), (6, 4));
                assert!(color.has_alpha());
                assert_eq!(format, Some(image::ImageFormat::Png));
            }
            other => panic!("expected image info, got {:?}", other),
        }
    }

    #[test]
    fn test_inspect_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();

        let result = inspect(&path, 50.0, &FixedDuration(1.0));
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }
}
