//! Dimlight Core — dark-mode desaturating resource provider.
//!
//! This crate contains the color math, the single-flight transform cache,
//! the asset store abstraction and the `Resources` facade that ties them
//! together. No UI or platform dependencies.

pub mod assets;
pub mod cache;
pub mod color;
pub mod context;
pub mod error;
pub mod id;
pub mod image;
pub mod resources;
pub mod transform;

// Re-exports for convenience.
pub use assets::{AssetStore, DirAssetStore, MemoryAssetStore};
pub use cache::{CacheKey, CacheStats, ImageCache, SingleFlightCache};
pub use color::{ColorStateList, Rgba};
pub use context::{Configuration, DisplayMetrics, ResourceContext};
pub use error::{AssetStoreError, ResolveError};
pub use id::ResourceId;
pub use crate::image::{DecodedImage, SourceFormat, TransformedImage};
pub use resources::{DesaturatedResources, PlainResources, Resources, encode_resolved};
pub use transform::params::{ColorDesaturation, EngineConfig, TransformParams};
