use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::AssetStore;
use crate::color::{ColorStateList, Rgba};
use crate::context::ResourceContext;
use crate::id::ResourceId;

/// In-memory asset store, ignoring the resource context.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetStore {
    images: HashMap<ResourceId, Arc<[u8]>>,
    colors: HashMap<ResourceId, Rgba>,
    state_lists: HashMap<ResourceId, ColorStateList>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, id: impl Into<ResourceId>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert_image(id, bytes);
        self
    }

    pub fn with_color(mut self, id: impl Into<ResourceId>, color: Rgba) -> Self {
        self.colors.insert(id.into(), color);
        self
    }

    pub fn with_color_state_list(
        mut self,
        id: impl Into<ResourceId>,
        list: ColorStateList,
    ) -> Self {
        self.state_lists.insert(id.into(), list);
        self
    }

    pub fn insert_image(&mut self, id: impl Into<ResourceId>, bytes: impl Into<Arc<[u8]>>) {
        self.images.insert(id.into(), bytes.into());
    }
}

impl AssetStore for MemoryAssetStore {
    fn read(&self, id: &ResourceId, _ctx: &ResourceContext) -> Option<Arc<[u8]>> {
        self.images.get(id).cloned()
    }

    fn color(&self, id: &ResourceId, _ctx: &ResourceContext) -> Option<Rgba> {
        self.colors.get(id).copied()
    }

    fn color_state_list(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<ColorStateList> {
        self.state_lists
            .get(id)
            .cloned()
            .or_else(|| self.color(id, ctx).map(ColorStateList::from_color))
    }
}
