//! Shared fixtures for the integration suites
//!
//! Synthetic images, handwritten model and range files, and lookup of the
//! optional reference data directory.

#![allow(dead_code)]

use brisque::FEATURE_COUNT;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Deterministic textured grayscale image with both signs of local contrast
pub fn textured_gray(width: u32, height: u32, seed: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        Luma([texture(x, y, seed)])
    }))
}

pub fn textured_rgb(width: u32, height: u32, seed: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            texture(x, y, seed),
            texture(y, x, seed + 1),
            texture(x + 3, y + 5, seed + 2),
        ])
    }))
}

pub fn textured_rgba(width: u32, height: u32, seed: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        let v = texture(x, y, seed);
        Rgba([v, v, v, ((x + y) % 256) as u8])
    }))
}

fn texture(x: u32, y: u32, seed: u32) -> u8 {
    ((x * 37 + y * 91 + seed * 13 + (x * y) % 17) % 256) as u8
}

/// Range file in the reference layout with every feature mapped from
/// `[min, max]`
pub fn range_file_text(min: f32, max: f32) -> String {
    let mut text = String::from("x\n-1 1\n");
    for i in 1..=FEATURE_COUNT {
        text.push_str(&format!("{i} {min} {max}\n"));
    }
    text
}

/// Linear epsilon-SVR model predicting `scaled[0] - 0.5 * scaled[1] - rho`
pub fn linear_model_text(rho: f64) -> String {
    format!(
        "svm_type epsilon_svr\n\
         kernel_type linear\n\
         nr_class 2\n\
         total_sv 2\n\
         rho {rho}\n\
         SV\n\
         1 1:1\n\
         -0.5 2:1\n"
    )
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// Directory with the reference model, range file and test images, if set
pub fn reference_data_dir() -> Option<PathBuf> {
    std::env::var_os("BRISQUE_DATA_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

/// First file in `dir` whose stem is `stem`, whatever its extension
pub fn find_by_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .find(|path| path.file_stem().and_then(|s| s.to_str()) == Some(stem))
}
