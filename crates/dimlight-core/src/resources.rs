//! Resource providers — the lookup capability and its two implementations.
//!
//! Callers hold a `dyn Resources` and cannot tell whether they got the plain
//! provider or the desaturating one. Swapping providers is how a host
//! switches appearance: a provider's parameters never change after
//! construction, which keeps its cache keys stable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assets::AssetStore;
use crate::cache::{CacheKey, CacheStats, ImageCache, SingleFlightCache};
use crate::color::{ColorStateList, Rgba};
use crate::context::ResourceContext;
use crate::error::ResolveError;
use crate::id::ResourceId;
use crate::image::{DecodedImage, TransformedImage};
use crate::transform::params::{ColorDesaturation, EngineConfig, TransformParams};
use crate::transform::pixel::transform_image;

/// Resource lookup by id.
pub trait Resources: Send + Sync {
    /// Decoded image for `id`, with this provider's transform applied.
    fn resolve(&self, id: &ResourceId) -> Result<Arc<TransformedImage>, ResolveError>;

    /// A plain color resource.
    fn color(&self, id: &ResourceId) -> Result<Rgba, ResolveError>;

    /// A color state list resource.
    fn color_state_list(&self, id: &ResourceId) -> Result<Arc<ColorStateList>, ResolveError>;

    /// The context forwarded to the backing store.
    fn context(&self) -> &ResourceContext;

    /// The resolved image re-encoded in its source format.
    fn encoded(&self, id: &ResourceId) -> Result<Vec<u8>, ResolveError> {
        let image = self.resolve(id)?;
        encode_resolved(id, &image)
    }
}

/// Re-encode an image resolved for `id` in its source format.
pub fn encode_resolved(
    id: &ResourceId,
    image: &TransformedImage,
) -> Result<Vec<u8>, ResolveError> {
    image.encode().map_err(|e| ResolveError::Encode {
        id: id.clone(),
        reason: e.to_string(),
    })
}

/// Read and decode an image from `store`.
fn load_image(
    store: &dyn AssetStore,
    ctx: &ResourceContext,
    id: &ResourceId,
) -> Result<DecodedImage, ResolveError> {
    let bytes = store
        .read(id, ctx)
        .ok_or_else(|| ResolveError::ResourceNotFound(id.clone()))?;

    DecodedImage::decode(&bytes).map_err(|e| {
        warn!(%id, error = %e, "failed to decode image resource");
        ResolveError::Decode {
            id: id.clone(),
            reason: e.to_string(),
        }
    })
}

/// Pass-through provider. Decodes on every call and never transforms.
pub struct PlainResources {
    store: Arc<dyn AssetStore>,
    context: ResourceContext,
}

impl PlainResources {
    pub fn new(store: Arc<dyn AssetStore>, context: ResourceContext) -> Self {
        Self { store, context }
    }
}

impl Resources for PlainResources {
    fn resolve(&self, id: &ResourceId) -> Result<Arc<TransformedImage>, ResolveError> {
        let image = load_image(self.store.as_ref(), &self.context, id)?;
        Ok(Arc::new(TransformedImage::new(image, TransformParams::identity())))
    }

    fn color(&self, id: &ResourceId) -> Result<Rgba, ResolveError> {
        self.store
            .color(id, &self.context)
            .ok_or_else(|| ResolveError::ResourceNotFound(id.clone()))
    }

    fn color_state_list(&self, id: &ResourceId) -> Result<Arc<ColorStateList>, ResolveError> {
        self.store
            .color_state_list(id, &self.context)
            .map(Arc::new)
            .ok_or_else(|| ResolveError::ResourceNotFound(id.clone()))
    }

    fn context(&self) -> &ResourceContext {
        &self.context
    }
}

/// Provider that desaturates and darkens images, and desaturates colors in
/// dark mode.
///
/// Images are memoized per `(id, params)`; concurrent first requests for the
/// same image share a single decode and transform. Color state lists are
/// memoized per id in dark mode. Plain colors are cheap and never cached.
pub struct DesaturatedResources {
    store: Arc<dyn AssetStore>,
    context: ResourceContext,
    params: TransformParams,
    color: ColorDesaturation,
    images: ImageCache,
    state_lists: SingleFlightCache<ResourceId, ColorStateList, ResolveError>,
}

impl DesaturatedResources {
    /// Build a provider from a config snapshot.
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn AssetStore>,
        context: ResourceContext,
    ) -> Self {
        let params = config.transform_params();
        info!(
            dark_mode = params.dark_mode(),
            darkness = params.darkness_amount(),
            saturation = params.saturation_amount(),
            "created desaturated resources"
        );
        Self {
            store,
            context,
            params,
            color: config.color,
            images: ImageCache::new(),
            state_lists: SingleFlightCache::new(),
        }
    }

    /// Build a provider from the three raw parameters, with default color
    /// desaturation.
    pub fn with_params(
        dark_mode: bool,
        darkness_amount: f32,
        saturation_amount: f32,
        store: Arc<dyn AssetStore>,
        context: ResourceContext,
    ) -> Self {
        let config = EngineConfig {
            dark_mode,
            darkness_amount,
            saturation_amount,
            ..EngineConfig::default()
        };
        Self::new(&config, store, context)
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn color_desaturation(&self) -> &ColorDesaturation {
        &self.color
    }

    /// Activity counters of the image cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.images.stats()
    }

    /// Whether a transformed image for `id` is currently stored.
    pub fn is_cached(&self, id: &ResourceId) -> bool {
        self.images.contains(&CacheKey::new(id.clone(), self.params))
    }

    /// Number of transformed images currently stored.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    /// Drop every memoized image and color state list.
    pub fn clear_cache(&self) {
        self.images.clear();
        self.state_lists.clear();
    }
}

impl Resources for DesaturatedResources {
    fn resolve(&self, id: &ResourceId) -> Result<Arc<TransformedImage>, ResolveError> {
        let key = CacheKey::new(id.clone(), self.params);
        self.images.get_or_compute(key, || {
            let source = load_image(self.store.as_ref(), &self.context, id)?;
            debug!(
                %id,
                width = source.width,
                height = source.height,
                format = %source.format,
                "transforming image resource"
            );
            Ok(TransformedImage::new(
                transform_image(&source, &self.params),
                self.params,
            ))
        })
    }

    fn color(&self, id: &ResourceId) -> Result<Rgba, ResolveError> {
        let color = self
            .store
            .color(id, &self.context)
            .ok_or_else(|| ResolveError::ResourceNotFound(id.clone()))?;
        if self.params.dark_mode() {
            Ok(self.color.apply(color))
        } else {
            Ok(color)
        }
    }

    fn color_state_list(&self, id: &ResourceId) -> Result<Arc<ColorStateList>, ResolveError> {
        let load = || {
            self.store
                .color_state_list(id, &self.context)
                .ok_or_else(|| ResolveError::ResourceNotFound(id.clone()))
        };

        if !self.params.dark_mode() {
            return load().map(Arc::new);
        }

        self.state_lists.get_or_compute(id.clone(), || {
            let list = load()?;
            Ok(list.map_colors(|c| self.color.apply(c)))
        })
    }

    fn context(&self) -> &ResourceContext {
        &self.context
    }
}
