//! Directory-backed asset store with platform-style qualifier directories.
//!
//! ```text
//! <root>/
//!   colors.json               {"accent": "#FF4081", ...}
//!   color_states.json         {"button": [{"states": [16842919], "color": "#..."}, ...]}
//!   drawable-night-xhdpi/     night + density qualified
//!   drawable-night/           night qualified
//!   drawable-xhdpi/           density qualified
//!   drawable/                 unqualified
//! ```
//!
//! Image files are looked up as `<stem>.<ext>` in the most specific matching
//! directory first. Night directories are only consulted when the
//! configuration asks for night mode.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::assets::AssetStore;
use crate::color::{ColorStateList, Rgba, StateColor, parse_hex};
use crate::context::ResourceContext;
use crate::error::AssetStoreError;
use crate::id::ResourceId;

/// Extensions probed for image resources, in order.
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "webp", "jpg", "jpeg", "gif", "bmp", "tiff"];

const COLORS_MANIFEST: &str = "colors.json";
const STATE_LISTS_MANIFEST: &str = "color_states.json";

#[derive(Deserialize)]
struct StateColorEntry {
    #[serde(default)]
    states: Vec<i32>,
    color: String,
}

/// Asset store reading images from a resource directory tree.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
    colors: HashMap<String, Rgba>,
    state_lists: HashMap<String, ColorStateList>,
}

impl DirAssetStore {
    /// Open `root` and load its color manifests. Missing manifests are empty.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AssetStoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AssetStoreError::NotADirectory(root));
        }

        let raw_colors: Option<HashMap<String, String>> =
            read_manifest(&root.join(COLORS_MANIFEST))?;
        let colors: HashMap<String, Rgba> = match raw_colors {
            Some(raw) => raw
                .into_iter()
                .map(|(name, value)| -> Result<(String, Rgba), AssetStoreError> {
                    let color = parse_color(&name, &value)?;
                    Ok((name, color))
                })
                .collect::<Result<_, AssetStoreError>>()?,
            None => HashMap::new(),
        };

        let raw_state_lists: Option<HashMap<String, Vec<StateColorEntry>>> =
            read_manifest(&root.join(STATE_LISTS_MANIFEST))?;
        let state_lists: HashMap<String, ColorStateList> = match raw_state_lists {
            Some(raw) => raw
                .into_iter()
                .map(|(name, entries)| -> Result<(String, ColorStateList), AssetStoreError> {
                    let entries = entries
                        .into_iter()
                        .map(|entry| -> Result<StateColor, AssetStoreError> {
                            Ok(StateColor {
                                states: entry.states,
                                color: parse_color(&name, &entry.color)?,
                            })
                        })
                        .collect::<Result<Vec<_>, AssetStoreError>>()?;
                    Ok((name, ColorStateList::new(entries)))
                })
                .collect::<Result<_, AssetStoreError>>()?,
            None => HashMap::new(),
        };

        debug!(
            root = %root.display(),
            colors = colors.len(),
            state_lists = state_lists.len(),
            "opened asset directory"
        );

        Ok(Self {
            root,
            colors,
            state_lists,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate directories for `ctx`, most specific first.
    fn search_dirs(&self, ctx: &ResourceContext) -> Vec<PathBuf> {
        let bucket = ctx.metrics.density_bucket();
        let mut dirs = Vec::with_capacity(4);
        if ctx.configuration.night_mode {
            dirs.push(self.root.join(format!("drawable-night-{bucket}")));
            dirs.push(self.root.join("drawable-night"));
        }
        dirs.push(self.root.join(format!("drawable-{bucket}")));
        dirs.push(self.root.join("drawable"));
        dirs
    }

    /// Path of the file that would serve `id` under `ctx`.
    pub fn locate(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<PathBuf> {
        let stem = id.file_stem();
        self.search_dirs(ctx).into_iter().find_map(|dir| {
            IMAGE_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{stem}.{ext}")))
                .find(|path| path.is_file())
        })
    }
}

impl AssetStore for DirAssetStore {
    fn read(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<Arc<[u8]>> {
        let path = self.locate(id, ctx)?;
        match fs::read(&path) {
            Ok(bytes) => Some(bytes.into()),
            Err(e) => {
                warn!(%id, path = %path.display(), error = %e, "failed to read asset");
                None
            }
        }
    }

    fn color(&self, id: &ResourceId, _ctx: &ResourceContext) -> Option<Rgba> {
        self.colors.get(id.file_stem().as_ref()).copied()
    }

    fn color_state_list(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<ColorStateList> {
        self.state_lists
            .get(id.file_stem().as_ref())
            .cloned()
            .or_else(|| self.color(id, ctx).map(ColorStateList::from_color))
    }
}

fn read_manifest<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, AssetStoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AssetStoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| AssetStoreError::Manifest {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_color(name: &str, value: &str) -> Result<Rgba, AssetStoreError> {
    parse_hex(value).ok_or_else(|| AssetStoreError::InvalidColor {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Configuration, DisplayMetrics};

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn ctx(density_dpi: u32, night_mode: bool) -> ResourceContext {
        ResourceContext::new(
            DisplayMetrics {
                density_dpi,
                ..Default::default()
            },
            Configuration {
                night_mode,
                locale: None,
            },
        )
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirAssetStore::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AssetStoreError::NotADirectory(_)));
    }

    #[test]
    fn test_qualified_directories_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "drawable/logo.png", b"plain");
        write(dir.path(), "drawable-xhdpi/logo.png", b"xhdpi");
        write(dir.path(), "drawable-night/logo.png", b"night");
        let store = DirAssetStore::open(dir.path()).unwrap();
        let id = ResourceId::from("logo");

        assert_eq!(&*store.read(&id, &ctx(160, false)).unwrap(), b"plain");
        assert_eq!(&*store.read(&id, &ctx(320, false)).unwrap(), b"xhdpi");
        assert_eq!(&*store.read(&id, &ctx(320, true)).unwrap(), b"night");
    }

    #[test]
    fn test_integer_ids_map_to_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "drawable/42.webp", b"forty-two");
        let store = DirAssetStore::open(dir.path()).unwrap();

        assert_eq!(&*store.read(&ResourceId::Int(42), &ctx(160, false)).unwrap(), b"forty-two");
        assert!(store.read(&ResourceId::Int(9999), &ctx(160, false)).is_none());
    }

    #[test]
    fn test_color_manifests() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "colors.json", br##"{"accent": "#FF4081", "scrim": "#80000000"}"##);
        write(
            dir.path(),
            "color_states.json",
            br##"{"button": [{"states": [16842919], "color": "#FF0000"}, {"color": "#00FF00"}]}"##,
        );
        let store = DirAssetStore::open(dir.path()).unwrap();
        let c = ctx(160, false);

        assert_eq!(store.color(&"accent".into(), &c), Some([0xFF, 0x40, 0x81, 0xFF]));
        assert_eq!(store.color(&"scrim".into(), &c), Some([0, 0, 0, 0x80]));

        let list = store.color_state_list(&"button".into(), &c).unwrap();
        assert_eq!(list.entries().len(), 2);
        assert_eq!(list.default_color(), Some([0, 255, 0, 255]));

        let single = store.color_state_list(&"accent".into(), &c).unwrap();
        assert!(!single.is_stateful());
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "colors.json", br#"{"bad": "blue"}"#);
        let err = DirAssetStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, AssetStoreError::InvalidColor { name, .. } if name == "bad"));
    }

    #[test]
    fn test_malformed_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "colors.json", b"{not json");
        let err = DirAssetStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, AssetStoreError::Manifest { .. }));
    }
}
