//! Shell configuration loaded from `squall.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SquallError};

/// User-tunable settings.
///
/// Every field has a default, so a missing or empty `squall.toml` yields a
/// fully usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Prompt text shown by the line editor.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Directory `locate` searches.
    #[serde(default = "default_search_root")]
    pub search_root: PathBuf,
    /// Directory `download` saves into (created on demand).
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_prompt() -> String {
    "squall > ".to_string()
}

fn default_search_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            search_root: default_search_root(),
            download_dir: default_download_dir(),
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SquallError::Config(format!("squall.toml: {e}")))
    }

    /// Load `squall.toml` from `dir`, falling back to defaults when the file
    /// does not exist. A file that exists but fails to parse is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("squall.toml");
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        Self::from_toml(&text)
    }
}
