/// Utility functions for common operations
///
/// This module contains helper functions that are used across multiple modules
/// to reduce code duplication and improve maintainability.
use crate::constants::{
    IMAGE_EXTENSIONS, PROGRESS_BAR_TEMPLATE, PROGRESS_DONE, PROGRESS_SPINNER_TEMPLATE,
    VIDEO_EXTENSIONS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            extensions.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Check if a file path represents a supported image file
pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS)
}

/// Check if a file path represents a supported video container
pub fn is_video_file(path: &Path) -> bool {
    has_extension_in(path, VIDEO_EXTENSIONS)
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Create a 0..=100 percentage bar for encode progress
pub fn create_percent_bar() -> ProgressBar {
    let pb = ProgressBar::new(PROGRESS_DONE as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Format file size in human-readable format
///
/// # Returns
/// * Size with one decimal and a binary unit (e.g., "512.0 B", "1.5 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < THRESHOLD {
            return format!("{:.1} {}", size, unit);
        }
        size /= THRESHOLD;
    }
    format!("{:.1} TB", size)
}

/// Calculate size reduction as a percentage
///
/// # Returns
/// * `(original - compressed) / original * 100`; negative when the output grew.
///   An empty original yields 0.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.bmp")));
        assert!(is_image_file(Path::new("test.tiff")));
        assert!(is_image_file(Path::new("test.gif")));

        assert!(!is_image_file(Path::new("test.mp4")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("clip.MKV")));
        assert!(is_video_file(Path::new("clip.m4v")));
        assert!(!is_video_file(Path::new("clip.jpg")));
        assert!(!is_video_file(Path::new("clip")));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0.0 B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2.0 TB");
    }

    #[test]
    fn test_calculate_compression_ratio() {
        assert_eq!(calculate_compression_ratio(1000, 800), 20.0);
        assert_eq!(calculate_compression_ratio(1000, 1200), -20.0);
        assert_eq!(calculate_compression_ratio(1000, 1000), 0.0);
        assert_eq!(calculate_compression_ratio(0, 500), 0.0);
    }
}
