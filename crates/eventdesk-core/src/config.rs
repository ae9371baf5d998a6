//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend base URL, the last login used, and where the session is
//! persisted.
//!
//! Configuration is stored at `~/.config/eventdesk/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStorage, FileStorage, KeyringStorage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "eventdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither config nor environment names one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment override for the backend base URL
pub const API_URL_ENV: &str = "EVENTDESK_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_login: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed session
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL, with `EVENTDESK_API_URL` taking precedence over the file
    pub fn base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn open_storage(&self) -> Result<Arc<dyn CredentialStorage>> {
        let storage: Arc<dyn CredentialStorage> = match self.storage {
            StorageBackend::File => Arc::new(FileStorage::new(self.data_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.json")).unwrap();

        assert_eq!(config.api_base_url, None);
        assert_eq!(config.storage, StorageBackend::File);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("eventdesk").join("config.json");
        let config = Config {
            api_base_url: Some("https://api.example.com".to_string()),
            last_login: Some("host@example.com".to_string()),
            storage: StorageBackend::Keyring,
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.api_base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(loaded.last_login.as_deref(), Some("host@example.com"));
        assert_eq!(loaded.storage, StorageBackend::Keyring);
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"keyring\""));
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{oops").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    // The only test that touches the process environment
    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        std::env::remove_var(API_URL_ENV);
        assert_eq!(config.base_url(), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("https://file.example.com".to_string());
        assert_eq!(config.base_url(), "https://file.example.com");

        std::env::set_var(API_URL_ENV, "https://env.example.com");
        assert_eq!(config.base_url(), "https://env.example.com");

        std::env::set_var(API_URL_ENV, "  ");
        assert_eq!(config.base_url(), "https://file.example.com");

        std::env::remove_var(API_URL_ENV);
        assert_eq!(config.base_url(), "https://file.example.com");
    }
}
