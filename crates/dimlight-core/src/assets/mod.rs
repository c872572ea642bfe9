//! Read-only backing stores for raw resources.

mod dir;
mod memory;

use std::sync::Arc;

use crate::color::{ColorStateList, Rgba};
use crate::context::ResourceContext;
use crate::id::ResourceId;

pub use dir::DirAssetStore;
pub use memory::MemoryAssetStore;

/// Source of untransformed resources.
///
/// Implementations are shared across threads and must never hand out data
/// that changes between calls for the same id and context.
pub trait AssetStore: Send + Sync {
    /// Raw encoded bytes for an image resource.
    fn read(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<Arc<[u8]>>;

    /// A plain color resource.
    fn color(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<Rgba>;

    /// A color state list resource. Plain colors resolve as single-entry lists.
    fn color_state_list(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<ColorStateList> {
        self.color(id, ctx).map(ColorStateList::from_color)
    }
}
