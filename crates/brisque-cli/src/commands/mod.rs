pub mod features;
pub mod score;

use anyhow::{Context as _, Result};
use image::DynamicImage;
use std::path::Path;

pub(crate) fn open_image(path: &Path) -> Result<DynamicImage> {
    brisque::open_image(path).with_context(|| format!("Failed to decode image {}", path.display()))
}
