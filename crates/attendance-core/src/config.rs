//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the gateway endpoint, request timeout, and last used
//! username.
//!
//! Configuration is stored at `~/.config/attendance/config.json`. The
//! endpoint can be overridden with `ATTENDANCE_ENDPOINT_URL`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "attendance";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "ATTENDANCE_ENDPOINT_URL";

/// Gateway used when neither the environment nor the config names one.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbwXo8mCsBgpX45bUmAD70uGVFgu1FaUoS_JupeWlSXi6W6__b8JqWpeCzX3Yxnlm0I6Qw/exec";

/// HTTP request timeout in seconds.
/// Apps Script cold starts can take several seconds, 30s leaves headroom.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub endpoint_url: Option<String>,
    pub last_username: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Gateway endpoint: environment first, then config, then the default
    pub fn endpoint_url(&self) -> String {
        self.resolve_endpoint(std::env::var(ENDPOINT_ENV).ok())
    }

    fn resolve_endpoint(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.endpoint_url.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.endpoint_url.is_none());
        assert!(config.last_username.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            endpoint_url: Some("http://localhost:8080/exec".to_string()),
            last_username: Some("alice".to_string()),
            request_timeout_secs: Some(5),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_username.as_deref(), Some("alice"));
        assert_eq!(loaded.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_endpoint(None), DEFAULT_ENDPOINT_URL);

        config.endpoint_url = Some("http://config".to_string());
        assert_eq!(config.resolve_endpoint(None), "http://config");
        assert_eq!(
            config.resolve_endpoint(Some("http://env".to_string())),
            "http://env"
        );
        // Blank override is ignored
        assert_eq!(
            config.resolve_endpoint(Some("  ".to_string())),
            "http://config"
        );
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
