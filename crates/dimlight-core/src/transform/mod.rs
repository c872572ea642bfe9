//! Color transforms: parameter validation, the per-pixel image transform and
//! HSL color desaturation.

pub mod hsl;
pub mod params;
pub mod pixel;
