//! # Configuration
//!
//! Configuration is managed by [`confique`], which layers environment
//! variables over an optional TOML file over compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! 1. **Environment variables**: `FVT_NAMESPACE`, `FVT_SETTINGS_FILE`,
//!    `FVT_MAX_FEATURE_LIMIT`.
//! 2. **Project Config**: `fvt.toml` next to the layer documents.
//! 3. **Compiled Defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `namespace` | `FeatureVisibilityToggle` | Group under which panel settings are stored |
//! | `settings_file` | OS config dir | JSON file backing the settings store |
//! | `max_feature_limit` | `1000000` | Upper bound accepted for the display limit |

use crate::error::{FvtError, Result};
use crate::settings::DEFAULT_NAMESPACE;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the per-directory config.
pub const CONFIG_FILE: &str = "fvt.toml";

const SETTINGS_FILE: &str = "settings.json";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FvtConfig {
    /// Group under which panel settings are stored.
    #[config(default = "FeatureVisibilityToggle", env = "FVT_NAMESPACE")]
    pub namespace: String,

    /// Settings file. When absent, `settings.json` in the OS config directory.
    #[config(env = "FVT_SETTINGS_FILE")]
    pub settings_file: Option<PathBuf>,

    /// Largest accepted display limit.
    #[config(default = 1000000, env = "FVT_MAX_FEATURE_LIMIT")]
    pub max_feature_limit: usize,
}

impl Default for FvtConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            settings_file: None,
            max_feature_limit: 1_000_000,
        }
    }
}

impl FvtConfig {
    /// Load configuration for a layer directory. A missing `fvt.toml` is fine.
    pub fn load(dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(dir.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    /// Resolve the settings file path.
    pub fn settings_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.settings_file {
            return Ok(path.clone());
        }
        ProjectDirs::from("org", "fvt", "fvt")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .ok_or_else(|| FvtError::Settings("Could not determine config directory".to_string()))
    }

    /// Clamp a requested display limit to the configured maximum.
    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.min(self.max_feature_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = FvtConfig::default();
        assert_eq!(config.namespace, "FeatureVisibilityToggle");
        assert_eq!(config.max_feature_limit, 1_000_000);
        assert!(config.settings_file.is_none());
    }

    #[test]
    fn test_explicit_settings_path() {
        let config = FvtConfig {
            settings_file: Some(PathBuf::from("/tmp/fvt.json")),
            ..Default::default()
        };
        assert_eq!(config.settings_path().unwrap(), PathBuf::from("/tmp/fvt.json"));
    }

    #[test]
    fn test_clamp_limit() {
        let config = FvtConfig {
            max_feature_limit: 50,
            ..Default::default()
        };
        assert_eq!(config.clamp_limit(10), 10);
        assert_eq!(config.clamp_limit(500), 50);
        assert_eq!(config.clamp_limit(0), 0);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "namespace = \"Custom\"\nmax_feature_limit = 200\n",
        )
        .unwrap();

        let config = FvtConfig::load(dir.path()).unwrap();
        assert_eq!(config.namespace, "Custom");
        assert_eq!(config.max_feature_limit, 200);
    }
}
