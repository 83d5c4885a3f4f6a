use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api";

pub const BACKEND_URL_ENV: &str = "ZOMATO_CHAT_BACKEND_URL";
pub const API_PREFIX_ENV: &str = "ZOMATO_CHAT_API_PREFIX";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub backend_url: Option<String>,
    pub api_prefix: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Fill unset values from `ZOMATO_CHAT_*` environment variables.
    /// Environment wins over the file.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            self.backend_url = Some(url);
        }
        if let Ok(prefix) = std::env::var(API_PREFIX_ENV) {
            self.api_prefix = Some(prefix);
        }
        self
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn api_prefix(&self) -> &str {
        self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX)
    }

    /// Backend URL with the API prefix applied, e.g. `http://localhost:8000/api`
    pub fn api_base(&self) -> String {
        let url = self.backend_url().trim_end_matches('/');
        let prefix = self.api_prefix().trim_matches('/');
        if prefix.is_empty() {
            url.to_string()
        } else {
            format!("{}/{}", url, prefix)
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("zomato-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config, Config::new());
        assert_eq!(config.api_base(), "http://localhost:8000/api");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            backend_url: Some("http://example.test:9000/".to_string()),
            api_prefix: Some("".to_string()),
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.api_base(), "http://example.test:9000");
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn prefix_slashes_are_normalized() {
        let config = Config {
            backend_url: Some("http://host".to_string()),
            api_prefix: Some("/v1/api/".to_string()),
        };
        assert_eq!(config.api_base(), "http://host/v1/api");
    }
}
