//! Image preparation ahead of sampling: center crop, downscale, then mask.

use image::{DynamicImage, GenericImageView, imageops::FilterType};

use crate::config::{Cropping, ProminentConfig};
use crate::error::{ProminentError, Result};
use crate::mask::{MaskOutcome, apply_mask};

/// Keep the middle half of the image in both directions.
pub fn center_crop(img: &DynamicImage) -> Result<DynamicImage> {
    let (w, h) = img.dimensions();
    let (cw, ch) = (w / 2, h / 2);
    if cw == 0 || ch == 0 {
        return Err(ProminentError::invalid_parameter(
            "crop",
            format!("{w}x{h} image too small to center crop"),
        ));
    }
    Ok(img.crop_imm((w - cw) / 2, (h - ch) / 2, cw, ch))
}

/// Scale down to `width` (aspect ratio kept) if either side exceeds it.
pub fn downscale(img: DynamicImage, width: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= width && h <= width {
        return img;
    }
    let ratio = width as f32 / w as f32;
    let new_h = ((h as f32) * ratio).round().max(1.0) as u32;
    img.resize_exact(width, new_h, FilterType::Lanczos3)
}

/// Crop, downscale and mask `img` according to `config`.
///
/// A failed crop is not fatal: the uncropped image is used instead.
pub fn prepare(img: &DynamicImage, config: &ProminentConfig) -> Result<MaskOutcome> {
    if config.resize_width == 0 {
        return Err(ProminentError::invalid_parameter("resize_width", 0));
    }

    let working = match config.cropping {
        Cropping::NoCrop => img.clone(),
        Cropping::CenterCrop => center_crop(img).unwrap_or_else(|err| {
            log::warn!("failed cropping, using the full image: {err}");
            img.clone()
        }),
    };

    let working = downscale(working, config.resize_width);
    Ok(apply_mask(&working.to_rgba16(), &config.background_masks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    #[test]
    fn test_center_crop_keeps_middle() {
        let mut img = RgbaImage::from_pixel(8, 4, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 1, Rgba([255, 0, 0, 255]));
        let cropped = center_crop(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(cropped.dimensions(), (4, 2));
        assert_eq!(cropped.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_center_crop_too_small() {
        assert!(center_crop(&solid(1, 5, [0, 0, 0, 255])).is_err());
    }

    #[test]
    fn test_prepare_falls_back_when_crop_fails() {
        let config = ProminentConfig::default().with_background_masks(Vec::new());
        let outcome = prepare(&solid(1, 1, [1, 2, 3, 255]), &config).unwrap();
        assert_eq!(outcome.image.dimensions(), (1, 1));
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let out = downscale(solid(400, 200, [9, 9, 9, 255]), 80);
        assert_eq!(out.dimensions(), (80, 40));
        let out = downscale(solid(50, 60, [9, 9, 9, 255]), 80);
        assert_eq!(out.dimensions(), (50, 60));
        // tall images are still scaled by width
        let out = downscale(solid(40, 200, [9, 9, 9, 255]), 20);
        assert_eq!(out.dimensions(), (20, 100));
    }

    #[test]
    fn test_prepare_masks_after_resize() {
        let config = ProminentConfig::default().with_cropping(Cropping::NoCrop);
        let outcome = prepare(&solid(160, 160, [255, 255, 255, 255]), &config).unwrap();
        assert_eq!(outcome.image.dimensions(), (80, 80));
        assert_eq!(outcome.ignored, 80 * 80);
    }

    #[test]
    fn test_zero_resize_width_rejected() {
        let config = ProminentConfig::default().with_resize_width(0);
        assert!(prepare(&solid(4, 4, [0, 0, 0, 255]), &config).is_err());
    }
}
