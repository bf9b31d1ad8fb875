use crate::error::{MerchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_MIN_CHARACTERS: usize = 3;

pub const HOME_ENV: &str = "MERCH_HOME";
pub const API_URL_ENV: &str = "MERCH_API_URL";

/// Configuration for merch, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchConfig {
    /// Root of the item API (e.g. "https://merch.example.com")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Shortest name fragment that is searched without tags
    #[serde(default = "default_min_characters")]
    pub min_characters: usize,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_min_characters() -> usize {
    DEFAULT_MIN_CHARACTERS
}

impl Default for MerchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            min_characters: default_min_characters(),
        }
    }
}

impl MerchConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(MerchError::Io)?;
        let config: MerchConfig =
            serde_json::from_str(&content).map_err(MerchError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(MerchError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(MerchError::Serialization)?;
        fs::write(config_path, content).map_err(MerchError::Io)?;
        Ok(())
    }

    /// Applies `MERCH_API_URL` over whatever the file says.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        self
    }

    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(MerchError::Api(format!(
                "api-url must start with http:// or https://, got '{}'",
                url
            )));
        }
        self.api_url = url.to_string();
        Ok(())
    }

    pub fn set_min_characters(&mut self, value: &str) -> Result<()> {
        self.min_characters = value.trim().parse().map_err(|_| {
            MerchError::Api(format!("min-characters must be a number, got '{}'", value))
        })?;
        Ok(())
    }
}

/// The data directory: `$MERCH_HOME`, or the platform data dir.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    directories::ProjectDirs::from("com", "merch", "merch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| MerchError::Store("Could not determine data directory".to_string()))
}
