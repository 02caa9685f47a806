//! Image decoding

use brisque_common::Result;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Decode an image file of any format the `image` crate supports
///
/// # Errors
/// Returns `ImageError` when the file is missing, unreadable or not a
/// decodable image.
pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path)?;
    debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisque_common::QualityError;
    use image::{GrayImage, Luma};

    #[test]
    fn test_open_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ramp.png");
        GrayImage::from_fn(16, 8, |x, y| Luma([(x * 16 + y) as u8]))
            .save(&path)
            .unwrap();

        let img = open_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
        assert_eq!(img.to_luma8().get_pixel(3, 2)[0], 50);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = open_image("/nonexistent/frame.png").unwrap_err();
        assert!(matches!(err, QualityError::ImageError(_)));
    }

    #[test]
    fn test_undecodable_file_is_image_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("noise.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = open_image(&path).unwrap_err();
        assert!(matches!(err, QualityError::ImageError(_)));
        assert!(!err.is_invalid_input());
    }
}
