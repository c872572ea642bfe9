//! Parameters that define the desaturation transform.
//!
//! `TransformParams` is fixed for the lifetime of a provider and forms half
//! of every image cache key. It can only be built through
//! [`TransformParams::validate`], so every instance holds amounts in `[0, 1]`.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default darkness applied to images in dark mode.
const DEFAULT_DARKNESS: f32 = 0.5;
/// Default saturation blend toward luma for images.
const DEFAULT_SATURATION: f32 = 0.5;
/// Default HSL saturation reduction for colors in dark mode.
const DEFAULT_COLOR_AMOUNT: f32 = 0.25;
/// Default HSL saturation floor for colors in dark mode.
const DEFAULT_MIN_SATURATION: f32 = 0.75;

/// Clamp `value` into `[0, 1]`. NaN and `-0.0` both normalize to `0.0`.
fn clamp_unit(name: &'static str, value: f32) -> f32 {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) + 0.0
    };
    if clamped.to_bits() != value.to_bits() {
        debug!(parameter = name, requested = value, clamped, "clamped parameter into [0, 1]");
    }
    clamped
}

/// Validated, immutable image transform parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "UncheckedParams")]
pub struct TransformParams {
    dark_mode: bool,
    darkness_amount: f32,
    saturation_amount: f32,
}

/// Wire shape of [`TransformParams`] before validation.
#[derive(Deserialize)]
struct UncheckedParams {
    dark_mode: bool,
    darkness_amount: f32,
    saturation_amount: f32,
}

impl From<UncheckedParams> for TransformParams {
    fn from(raw: UncheckedParams) -> Self {
        Self::validate(raw.dark_mode, raw.darkness_amount, raw.saturation_amount)
    }
}

impl TransformParams {
    /// Build parameters, silently clamping both amounts into `[0, 1]`.
    ///
    /// Idempotent: validating already-valid amounts returns them unchanged.
    pub fn validate(dark_mode: bool, darkness_amount: f32, saturation_amount: f32) -> Self {
        Self {
            dark_mode,
            darkness_amount: clamp_unit("darkness_amount", darkness_amount),
            saturation_amount: clamp_unit("saturation_amount", saturation_amount),
        }
    }

    /// Light mode with no desaturation. Images pass through unchanged.
    pub const fn identity() -> Self {
        Self {
            dark_mode: false,
            darkness_amount: 0.0,
            saturation_amount: 0.0,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn darkness_amount(&self) -> f32 {
        self.darkness_amount
    }

    pub fn saturation_amount(&self) -> f32 {
        self.saturation_amount
    }

    /// True when applying these parameters cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        self.saturation_amount == 0.0 && (!self.dark_mode || self.darkness_amount == 0.0)
    }

    fn key_bits(&self) -> (bool, u32, u32) {
        (
            self.dark_mode,
            self.darkness_amount.to_bits(),
            self.saturation_amount.to_bits(),
        )
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::identity()
    }
}

// Amounts are normalized on construction, so bitwise comparison is exact.
impl PartialEq for TransformParams {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for TransformParams {}

impl Hash for TransformParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

/// HSL saturation reduction applied to color resources in dark mode.
///
/// Colors more saturated than `min_saturation` lose `amount` of HSL
/// saturation, but never drop below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "UncheckedColorDesaturation")]
pub struct ColorDesaturation {
    amount: f32,
    min_saturation: f32,
}

#[derive(Deserialize)]
#[serde(default)]
struct UncheckedColorDesaturation {
    amount: f32,
    min_saturation: f32,
}

impl Default for UncheckedColorDesaturation {
    fn default() -> Self {
        Self {
            amount: DEFAULT_COLOR_AMOUNT,
            min_saturation: DEFAULT_MIN_SATURATION,
        }
    }
}

impl From<UncheckedColorDesaturation> for ColorDesaturation {
    fn from(raw: UncheckedColorDesaturation) -> Self {
        Self::new(raw.amount, raw.min_saturation)
    }
}

impl ColorDesaturation {
    /// Build a color desaturation, clamping both values into `[0, 1]`.
    pub fn new(amount: f32, min_saturation: f32) -> Self {
        Self {
            amount: clamp_unit("color.amount", amount),
            min_saturation: clamp_unit("color.min_saturation", min_saturation),
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn min_saturation(&self) -> f32 {
        self.min_saturation
    }
}

impl Default for ColorDesaturation {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_AMOUNT, DEFAULT_MIN_SATURATION)
    }
}

/// Caller-owned engine configuration, typically loaded from JSON.
///
/// A provider is built from one snapshot of this struct. Toggling dark mode
/// means building a new provider, never mutating an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the host requested dark appearance.
    pub dark_mode: bool,
    /// Image darkening in dark mode. 0.0 = unchanged, 1.0 = black.
    pub darkness_amount: f32,
    /// Image blend toward luma. 0.0 = unchanged, 1.0 = grayscale.
    pub saturation_amount: f32,
    /// Color resource desaturation in dark mode.
    pub color: ColorDesaturation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            darkness_amount: DEFAULT_DARKNESS,
            saturation_amount: DEFAULT_SATURATION,
            color: ColorDesaturation::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validated image transform parameters for this config.
    pub fn transform_params(&self) -> TransformParams {
        TransformParams::validate(self.dark_mode, self.darkness_amount, self.saturation_amount)
    }
}
