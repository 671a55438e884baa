use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;

/// Bot settings read from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Platform authentication token, handed to the session layer as-is.
    #[serde(default)]
    pub token: String,
    /// Prefix that marks a text message as a command, e.g. `!`.
    #[serde(default = "default_prefix")]
    pub bot_prefix: String,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_prefix() -> String {
    "!".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            bot_prefix: default_prefix(),
            catalog_path: None,
        }
    }
}

impl Config {
    /// Read and parse a config file. A blank `botPrefix` falls back to `!`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&data)?;
        if config.bot_prefix.trim().is_empty() {
            warn!(path = %path.display(), "blank botPrefix, using the default");
            config.bot_prefix = default_prefix();
        }
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Catalog location, honoring an explicit override first.
    pub fn catalog_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.catalog_path.clone())
            .unwrap_or_else(|| PathBuf::from(crate::DEFAULT_CATALOG_PATH))
    }
}
