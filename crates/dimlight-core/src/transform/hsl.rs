//! HSL saturation reduction for color resources.
//!
//! Unlike the image transform, this leaves lightness and hue alone and only
//! pulls saturation toward a floor, so muted colors stay as they are.

use palette::{FromColor, Hsl, Srgb};

use crate::color::Rgba;
use crate::transform::params::ColorDesaturation;

/// Reduce the HSL saturation of `color` by `amount`, never below `min_saturation`.
///
/// Colors already at or below `min_saturation` are returned untouched, as is
/// any fully transparent color. The original alpha is preserved.
pub fn desaturate_color(color: Rgba, amount: f32, min_saturation: f32) -> Rgba {
    let alpha = color[3];
    if alpha == 0 {
        return color;
    }

    let rgb: Srgb<f32> = Srgb::new(color[0], color[1], color[2]).into_format();
    let mut hsl: Hsl = Hsl::from_color(rgb);
    if hsl.saturation <= min_saturation {
        return color;
    }
    hsl.saturation = (hsl.saturation - amount).clamp(min_saturation, 1.0);

    let out: Srgb<f32> = Srgb::from_color(hsl);
    let out: Srgb<u8> = out.into_format();
    [out.red, out.green, out.blue, alpha]
}

impl ColorDesaturation {
    /// Apply this desaturation to a single color.
    pub fn apply(&self, color: Rgba) -> Rgba {
        desaturate_color(color, self.amount(), self.min_saturation())
    }
}
