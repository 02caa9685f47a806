//! Conversion of decoded images to normalized single-channel buffers

use brisque_common::{QualityError, Result};
use image::DynamicImage;
use ndarray::Array2;

// BT.601 luma weights in 14-bit fixed point (sum = 1 << 14)
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    // Max is 255 << 14 before rounding, so the shift always fits in u8
    ((weighted + LUMA_ROUND) >> LUMA_SHIFT) as u8
}

/// Convert interleaved 8-bit samples to a `height x width` buffer in [0, 1]
///
/// Supported layouts: 1 (gray), 2 (gray + alpha), 3 (RGB), 4 (RGBA).
/// Alpha is ignored.
///
/// # Errors
/// Returns `InvalidInput` for a zero-area image, an unsupported channel
/// count, or a sample slice whose length does not match the dimensions.
pub fn gray_from_samples(
    samples: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Array2<f64>> {
    if width == 0 || height == 0 {
        return Err(QualityError::InvalidInput(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    if !(1..=4).contains(&channels) {
        return Err(QualityError::InvalidInput(format!(
            "unsupported channel count: {channels}"
        )));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|area| area.checked_mul(channels))
        .ok_or_else(|| {
            QualityError::InvalidInput(format!(
                "image dimensions overflow ({width}x{height}x{channels})"
            ))
        })?;
    if samples.len() != expected {
        return Err(QualityError::InvalidInput(format!(
            "expected {} samples for {}x{}x{}, got {}",
            expected,
            width,
            height,
            channels,
            samples.len()
        )));
    }

    let levels: Vec<f64> = samples
        .chunks_exact(channels)
        .map(|px| {
            let level = match channels {
                1 | 2 => px[0],
                _ => luma(px[0], px[1], px[2]),
            };
            f64::from(level) / 255.0
        })
        .collect();

    Array2::from_shape_vec((height, width), levels)
        .map_err(|e| QualityError::InvalidInput(format!("invalid image shape: {e}")))
}

/// Convert a decoded image to a normalized grayscale buffer
///
/// 8-bit layouts are read directly; deeper sample types are first reduced
/// to 8 bits by the `image` crate.
///
/// # Errors
/// Returns `InvalidInput` for a zero-area image.
pub fn normalized_gray(image: &DynamicImage) -> Result<Array2<f64>> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    match image {
        DynamicImage::ImageLuma8(buf) => gray_from_samples(buf.as_raw(), width, height, 1),
        DynamicImage::ImageLumaA8(buf) => gray_from_samples(buf.as_raw(), width, height, 2),
        DynamicImage::ImageRgb8(buf) => gray_from_samples(buf.as_raw(), width, height, 3),
        DynamicImage::ImageRgba8(buf) => gray_from_samples(buf.as_raw(), width, height, 4),
        other if other.color().has_color() => {
            let rgb = other.to_rgb8();
            gray_from_samples(rgb.as_raw(), width, height, 3)
        }
        other => {
            let gray = other.to_luma8();
            gray_from_samples(gray.as_raw(), width, height, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        // 0.299 * 255 = 76.2
        assert_eq!(luma(255, 0, 0), 76);
        // 0.587 * 255 = 149.7
        assert_eq!(luma(0, 255, 0), 150);
        // 0.114 * 255 = 29.1
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_single_channel_used_directly() {
        let gray = gray_from_samples(&[0, 51, 102, 255], 2, 2, 1).unwrap();
        assert_eq!(gray.dim(), (2, 2));
        assert_eq!(gray[[0, 1]], 51.0 / 255.0);
        assert_eq!(gray[[1, 1]], 1.0);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let rgb = gray_from_samples(&[10, 200, 30], 1, 1, 3).unwrap();
        let rgba = gray_from_samples(&[10, 200, 30, 0], 1, 1, 4).unwrap();
        assert_eq!(rgb, rgba);

        let gray_alpha = gray_from_samples(&[128, 7], 1, 1, 2).unwrap();
        assert_eq!(gray_alpha[[0, 0]], 128.0 / 255.0);
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let err = gray_from_samples(&[0; 16], usize::MAX / 2, 3, 1).unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(ref msg) if msg.contains("overflow")));

        let err = gray_from_samples(&[0; 16], usize::MAX / 4, 2, 4).unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(_)));
    }

    #[test]
    fn test_row_major_layout() {
        // 3 wide, 2 high
        let gray = gray_from_samples(&[0, 1, 2, 3, 4, 5], 3, 2, 1).unwrap();
        assert_eq!(gray.dim(), (2, 3));
        assert_eq!(gray[[1, 0]], 3.0 / 255.0);
        assert_eq!(gray[[0, 2]], 2.0 / 255.0);
    }

    #[test]
    fn test_zero_area_rejected() {
        let err = gray_from_samples(&[], 0, 5, 1).unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(_)));

        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(normalized_gray(&empty).is_err());
    }

    #[test]
    fn test_bad_layout_rejected() {
        assert!(gray_from_samples(&[0; 10], 2, 1, 5).is_err());
        assert!(gray_from_samples(&[0; 3], 2, 1, 3).is_err());
    }

    #[test]
    fn test_dynamic_image_variants_agree() {
        let rgb = RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 40) as u8, (y * 70) as u8, 90]));
        let rgba = RgbaImage::from_fn(4, 3, |x, y| Rgba([(x * 40) as u8, (y * 70) as u8, 90, 255]));

        let from_rgb = normalized_gray(&DynamicImage::ImageRgb8(rgb)).unwrap();
        let from_rgba = normalized_gray(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(from_rgb, from_rgba);
        assert_eq!(from_rgb.dim(), (3, 4));

        let luma16 = DynamicImage::ImageLuma16(image::ImageBuffer::from_pixel(2, 2, Luma([u16::MAX])));
        let gray = normalized_gray(&luma16).unwrap();
        assert!(gray.iter().all(|&v| v == 1.0));
    }
}
