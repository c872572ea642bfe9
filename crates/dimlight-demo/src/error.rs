use std::path::PathBuf;

use dimlight_core::{AssetStoreError, ResolveError};

/// Errors that abort the demo run.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to open assets: {0}")]
    Assets(#[from] AssetStoreError),
    #[error("I/O error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{failed} of {total} resources failed to resolve")]
    Unresolved { failed: usize, total: usize },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
