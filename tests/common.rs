#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Opaque gradient PNG, large enough that JPEG output is clearly smaller.
pub fn create_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    });
    img.save(&path).unwrap();
    path
}

/// PNG with a fully transparent left half.
pub fn create_transparent_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_fn(32, 16, |x, _| {
        if x < 16 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([20, 40, 60, 255])
        }
    });
    img.save(&path).unwrap();
    path
}

pub fn create_fake_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a video").unwrap();
    path
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
