//! Display and configuration context forwarded to asset stores.
//!
//! The engine never interprets these values. They exist so a store can pick
//! density- or night-qualified variants the way a platform resource table does.

use serde::{Deserialize, Serialize};

/// Physical characteristics of the target display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayMetrics {
    pub width_px: u32,
    pub height_px: u32,
    /// Dots per inch. 160 is the baseline density.
    pub density_dpi: u32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            width_px: 1080,
            height_px: 1920,
            density_dpi: 160,
        }
    }
}

impl DisplayMetrics {
    /// Density qualifier bucket for `density_dpi`.
    pub const fn density_bucket(&self) -> &'static str {
        match self.density_dpi {
            0..=120 => "ldpi",
            121..=160 => "mdpi",
            161..=240 => "hdpi",
            241..=320 => "xhdpi",
            321..=480 => "xxhdpi",
            _ => "xxxhdpi",
        }
    }
}

/// Host configuration relevant to resource selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Whether night-qualified resources should be preferred.
    pub night_mode: bool,
    /// BCP 47 language tag, if known.
    pub locale: Option<String>,
}

/// Everything a store may consult when resolving an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceContext {
    pub metrics: DisplayMetrics,
    pub configuration: Configuration,
}

impl ResourceContext {
    pub fn new(metrics: DisplayMetrics, configuration: Configuration) -> Self {
        Self {
            metrics,
            configuration,
        }
    }
}
