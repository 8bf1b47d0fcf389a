//! Application configuration
//! Optional JSON file named by `GRAPH_SWITCHER_CONFIG`; every field has a default.

use crate::data::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "GRAPH_SWITCHER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Locale of the month labels
    pub locale: Locale,
    pub window_width: f32,
    pub window_height: f32,
    /// Fonts tried, in order, for Japanese glyphs before the platform defaults
    pub cjk_font_paths: Vec<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Ja,
            window_width: 900.0,
            window_height: 640.0,
            cjk_font_paths: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_ENV`], or defaults when it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
