use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`Config::base_dir`]
pub const BASE_DIR_ENV: &str = "CODESHELF_DIR";

const DEFAULT_BASE_DIR: &str = "Code_Snippets";
const DEFAULT_INDEX_FILE: &str = "snippets_metadata.json";

/// Where snippets live on disk.
///
/// Every field is optional in `config.toml`; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one folder per language plus the index file.
    /// Relative paths resolve against the working directory.
    pub base_dir: PathBuf,

    /// File name of the index document inside `base_dir`
    pub index_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

impl Config {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults, then the user's config file if there is one, then the
    /// `CODESHELF_DIR` environment variable.
    pub fn resolve() -> Result<Self> {
        let path = Self::default_config_path();
        let config = if path.is_file() {
            Self::load_from_path(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_override(std::env::var_os(BASE_DIR_ENV)))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if config.index_file.trim().is_empty() {
            return Err(Error::Config {
                path: path.to_path_buf(),
                reason: "index_file cannot be empty".to_string(),
            });
        }
        Ok(config)
    }

    /// Default config.toml path: ~/.config/codeshelf/config.toml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codeshelf")
            .join("config.toml")
    }

    pub fn with_env_override(mut self, base_dir: Option<OsString>) -> Self {
        if let Some(dir) = base_dir.filter(|d| !d.is_empty()) {
            self.base_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn index_path(&self) -> PathBuf {
        self.base_dir.join(&self.index_file)
    }
}
