use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::config::PreprocessConfig;

/// Decodes an uploaded photo from raw bytes.
///
/// Undecodable input is an error; no partial image is ever produced.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).context("input is not a decodable image")
}

/// Runs the configured preparation stages ahead of OCR.
///
/// The source image is left untouched; every enabled stage produces a new
/// buffer. Stage order is fixed: grayscale, contrast stretch, threshold,
/// resize to the engine's target dimensions.
pub fn preprocess(img: &DynamicImage, config: &PreprocessConfig) -> DynamicImage {
    let mut out = img.clone();

    if config.grayscale {
        out = DynamicImage::ImageLuma8(out.to_luma8());
    }
    if config.contrast_stretch {
        out = DynamicImage::ImageLuma8(stretch_contrast(&out.to_luma8()));
    }
    if let Some(cutoff) = config.threshold {
        out = DynamicImage::ImageLuma8(threshold_dark_text(&out.to_luma8(), cutoff));
    }
    if config.resize {
        out = out.resize_exact(config.target_width, config.target_height, FilterType::Lanczos3);
    }

    out
}

/// Linearly remaps the luma range so the darkest pixel becomes 0 and the
/// brightest 255. A flat image is returned unchanged.
pub fn stretch_contrast(img: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in img.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if min >= max {
        return img.clone();
    }

    let range = (max - min) as f32;
    let mut out = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let value = ((pixel[0] - min) as f32 * 255.0 / range).round() as u8;
        out.put_pixel(x, y, Luma([value]));
    }
    out
}

/// Binarizes for dark plate text on a bright background.
///
/// Pixels brighter than the cutoff become white (plate background), all
/// others black (characters). This sharpens the character/background
/// separation the engines key on.
pub fn threshold_dark_text(img: &GrayImage, cutoff: u8) -> GrayImage {
    let mut out = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] > cutoff { 255u8 } else { 0u8 };
        out.put_pixel(x, y, Luma([value]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = ((x + y) % 256) as u8;
            image::Rgb([v, v, v])
        }))
    }

    #[test]
    fn test_output_has_target_dimensions() {
        let config = PreprocessConfig::default();
        let out = preprocess(&gradient_image(123, 77), &config);
        assert_eq!(
            out.width(),
            config.target_width,
            "width must match the configured target"
        );
        assert_eq!(out.height(), config.target_height);
    }

    #[test]
    fn test_preprocess_idempotent_on_dimensions() {
        let config = PreprocessConfig::default();
        let once = preprocess(&gradient_image(400, 300), &config);
        let twice = preprocess(&once, &config);
        assert_eq!(once.width(), twice.width());
        assert_eq!(once.height(), twice.height());
    }

    #[test]
    fn test_source_image_not_mutated() {
        let source = gradient_image(64, 64);
        let before = source.to_luma8();
        let _ = preprocess(&source, &PreprocessConfig::default());
        assert_eq!(source.to_luma8(), before);
    }

    #[test]
    fn test_undecodable_bytes_are_an_error() {
        assert!(decode_image(b"definitely not an image").is_err());
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_stretch_contrast_expands_range() {
        // Luma values 100 and 150 must map to 0 and 255.
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([150]));
        let out = stretch_contrast(&img);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_stretch_contrast_flat_image_unchanged() {
        let img = GrayImage::from_pixel(3, 3, Luma([90]));
        assert_eq!(stretch_contrast(&img), img);
    }

    #[test]
    fn test_threshold_separates_text_from_background() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([20])); // plate character
        img.put_pixel(1, 0, Luma([200])); // background
        img.put_pixel(2, 0, Luma([150])); // exactly at the cutoff -> text
        let out = threshold_dark_text(&img, 150);
        assert_eq!(out.get_pixel(0, 0)[0], 0, "dark pixel stays text");
        assert_eq!(out.get_pixel(1, 0)[0], 255, "bright pixel is background");
        assert_eq!(out.get_pixel(2, 0)[0], 0, "cutoff value counts as text");
    }

    #[test]
    fn test_stages_can_be_disabled() {
        let config = PreprocessConfig {
            grayscale: false,
            contrast_stretch: false,
            threshold: None,
            resize: false,
            ..PreprocessConfig::default()
        };
        let source = gradient_image(50, 40);
        let out = preprocess(&source, &config);
        assert_eq!((out.width(), out.height()), (50, 40));
        assert_eq!(out.to_luma8(), source.to_luma8());
    }
}
