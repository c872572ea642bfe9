//! Per-pixel image transform: blend toward luma, then darken in dark mode.

use crate::color::Rgba;
use crate::image::DecodedImage;
use crate::transform::params::TransformParams;

/// Rec. 601 luma weights, in thousandths.
pub const LUMA_REC601: [u32; 3] = [299, 587, 114];

/// Luma of an 8-bit RGB triplet on the `[0, 255]` scale.
///
/// The weighted sum is exact in integers and divided once, so a luma that
/// lands on `.5` is represented exactly and always rounds up.
pub fn luma(rgb: [u8; 3]) -> f64 {
    let weighted: u32 = rgb
        .iter()
        .zip(LUMA_REC601)
        .map(|(&c, w)| u32::from(c) * w)
        .sum();
    f64::from(weighted) / 1000.0
}

/// Transform a single RGBA8 pixel.
///
/// Equivalent to the following on normalized `[0, 1]` channels:
///
/// ```text
/// gray = 0.299 R + 0.587 G + 0.114 B
/// c'   = c × (1 − saturation) + gray × saturation
/// c''  = c' × (1 − darkness)          (dark mode only)
/// ```
///
/// The math runs in `f64` on the `[0, 255]` scale. Output channels are
/// rounded to nearest (ties away from zero) and clamped to `[0, 255]`.
/// Alpha is never modified.
pub fn transform_pixel(pixel: Rgba, params: &TransformParams) -> Rgba {
    if params.is_identity() {
        return pixel;
    }

    let gray = luma([pixel[0], pixel[1], pixel[2]]);
    let saturation = f64::from(params.saturation_amount());

    let mut out = [pixel[0], pixel[1], pixel[2]]
        .map(|c| f64::from(c) * (1.0 - saturation) + gray * saturation);
    if params.dark_mode() {
        let keep = 1.0 - f64::from(params.darkness_amount());
        out = out.map(|c| c * keep);
    }

    [to_channel(out[0]), to_channel(out[1]), to_channel(out[2]), pixel[3]]
}

/// Apply [`transform_pixel`] to every pixel of an image.
pub fn transform_image(image: &DecodedImage, params: &TransformParams) -> DecodedImage {
    let pixels = if params.is_identity() {
        image.pixels.clone()
    } else {
        image
            .pixels
            .iter()
            .map(|&px| transform_pixel(px, params))
            .collect()
    };

    DecodedImage {
        width: image.width,
        height: image.height,
        pixels,
        format: image.format,
    }
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pixels() -> Vec<Rgba> {
        vec![
            [255, 0, 0, 255],
            [0, 255, 0, 128],
            [0, 0, 255, 0],
            [10, 200, 30, 255],
            [128, 64, 32, 17],
            [0, 0, 0, 255],
            [255, 255, 255, 255],
        ]
    }

    #[test]
    fn test_zero_saturation_light_mode_is_identity() {
        let params = TransformParams::validate(false, 0.8, 0.0);
        for px in sample_pixels() {
            assert_eq!(transform_pixel(px, &params), px);
        }
    }

    #[test]
    fn test_full_saturation_produces_rounded_luma() {
        let params = TransformParams::validate(false, 0.0, 1.0);
        for r in 0..=255_u8 {
            for g in 0..=255_u8 {
                for b in 0..=255_u8 {
                    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
                    let expected = ((weighted + 500) / 1000) as u8;
                    assert_eq!(
                        transform_pixel([r, g, b, 255], &params),
                        [expected, expected, expected, 255],
                        "pixel {:?}",
                        [r, g, b]
                    );
                }
            }
        }
    }

    #[test]
    fn test_half_luma_rounds_up() {
        let params = TransformParams::validate(false, 0.0, 1.0);
        // 0.299 × 2 + 0.587 × 16 + 0.114 × 215 = 34.5
        assert_eq!(luma([2, 16, 215]), 34.5);
        assert_eq!(transform_pixel([2, 16, 215, 9], &params), [35, 35, 35, 9]);
    }

    #[test]
    fn test_full_darkness_produces_black() {
        for saturation in [0.0, 0.3, 1.0] {
            let params = TransformParams::validate(true, 1.0, saturation);
            for px in sample_pixels() {
                assert_eq!(transform_pixel(px, &params), [0, 0, 0, px[3]]);
            }
        }
    }

    #[test]
    fn test_darkness_ignored_in_light_mode() {
        let params = TransformParams::validate(false, 1.0, 1.0);
        assert_eq!(transform_pixel([255, 0, 0, 255], &params), [76, 76, 76, 255]);
    }

    #[test]
    fn test_red_desaturated_and_halved() {
        let params = TransformParams::validate(true, 0.5, 1.0);
        assert_eq!(transform_pixel([255, 0, 0, 255], &params), [38, 38, 38, 255]);
    }

    #[test]
    fn test_partial_saturation_blends_toward_gray() {
        let params = TransformParams::validate(false, 0.0, 0.5);
        let result = transform_pixel([255, 0, 0, 255], &params);
        // 0.5 × 1.0 + 0.5 × 0.299 = 0.6495 → 166; 0.5 × 0.299 → 38
        assert_eq!(result, [166, 38, 38, 255]);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let params = TransformParams::validate(true, 0.37, 0.61);
        for px in sample_pixels() {
            assert_eq!(transform_pixel(px, &params), transform_pixel(px, &params));
        }
    }

    #[test]
    fn test_transform_image_keeps_shape() {
        let image = DecodedImage::solid(3, 2, [255, 0, 0, 200], crate::SourceFormat::Png);
        let params = TransformParams::validate(true, 0.5, 1.0);
        let out = transform_image(&image, &params);
        assert_eq!((out.width, out.height), (3, 2));
        assert_eq!(out.format, image.format);
        assert!(out.pixels.iter().all(|&px| px == [38, 38, 38, 200]));
    }
}
