//! Error types for resource resolution and asset store setup.

use std::path::PathBuf;

use crate::id::ResourceId;

/// Failure to resolve a resource through a [`Resources`](crate::Resources) provider.
///
/// `Clone` so a single failed computation can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    #[error("failed to decode resource {id}: {reason}")]
    Decode { id: ResourceId, reason: String },
    #[error("failed to encode resource {id}: {reason}")]
    Encode { id: ResourceId, reason: String },
}

impl ResolveError {
    /// The resource this error refers to.
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::ResourceNotFound(id) => id,
            Self::Decode { id, .. } | Self::Encode { id, .. } => id,
        }
    }
}

/// Failure to open a directory-backed asset store.
#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    #[error("asset root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid color {value:?} for {name}")]
    InvalidColor { name: String, value: String },
}
