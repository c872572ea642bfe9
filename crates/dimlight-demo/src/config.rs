//! Engine configuration for the demo: JSON file plus command-line overrides.

use std::path::Path;

use dimlight_core::EngineConfig;

use crate::error::DemoError;

/// Values given on the command line. `None` keeps the file or default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub dark_mode: Option<bool>,
    pub darkness_amount: Option<f32>,
    pub saturation_amount: Option<f32>,
}

/// Load the engine config from `path`, or defaults when no path is given,
/// then apply `overrides`.
pub fn load_engine_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<EngineConfig, DemoError> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| DemoError::ReadConfig {
                path: path.to_path_buf(),
                source,
            })?;
            EngineConfig::from_json(&text).map_err(|source| DemoError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => EngineConfig::default(),
    };

    if let Some(dark_mode) = overrides.dark_mode {
        config.dark_mode = dark_mode;
    }
    if let Some(darkness) = overrides.darkness_amount {
        config.darkness_amount = darkness;
    }
    if let Some(saturation) = overrides.saturation_amount {
        config.saturation_amount = saturation;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load_engine_config(None, Overrides::default()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"dark_mode": false, "darkness_amount": 0.2}"#).unwrap();

        let config = load_engine_config(
            Some(&path),
            Overrides {
                dark_mode: Some(true),
                saturation_amount: Some(0.9),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(config.dark_mode);
        assert_eq!(config.darkness_amount, 0.2);
        assert_eq!(config.saturation_amount, 0.9);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, "dark_mode = true").unwrap();

        let err = load_engine_config(Some(&path), Overrides::default()).unwrap_err();
        assert!(matches!(err, DemoError::ParseConfig { .. }));
    }
}
