//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend base URL, where the credential is kept, the request timeout
//! and the last email used to log in.
//!
//! Configuration is stored at `~/.config/blogadmin/config.json`. Environment
//! variables (optionally from a `.env` file) override the stored values for
//! the current run only; they are never written back to the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "blogadmin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the backend base URL
pub const ENV_BASE_URL: &str = "BLOG_ADMIN_BASE_URL";

/// Environment variable pre-filling the login email
pub const ENV_EMAIL: &str = "BLOG_ADMIN_EMAIL";

/// Environment variable pre-filling the login password
pub const ENV_PASSWORD: &str = "BLOG_ADMIN_PASSWORD";

/// Where the credential is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    /// `token` file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Nothing persisted; the session ends with the process
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stored backend URL; use [`Config::backend_url`] for the effective one
    pub base_url: String,
    pub token_storage: TokenStorage,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,

    #[serde(skip)]
    overrides: Overrides,
}

/// Values taken from the environment for this run.
#[derive(Clone, Default)]
struct Overrides {
    base_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_storage: TokenStorage::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
            overrides: Overrides::default(),
        }
    }
}

impl Config {
    /// Load the stored configuration and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
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

    /// Apply overrides from a variable lookup (the process environment in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        self.overrides = Overrides {
            base_url: non_blank(ENV_BASE_URL),
            email: non_blank(ENV_EMAIL),
            password: lookup(ENV_PASSWORD).filter(|v| !v.is_empty()),
        };
    }

    /// Backend URL for this run, without a trailing slash.
    pub fn backend_url(&self) -> String {
        self.overrides
            .base_url
            .as_deref()
            .unwrap_or(&self.base_url)
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    /// Email to pre-fill at login.
    pub fn login_email(&self) -> Option<&str> {
        self.overrides.email.as_deref().or(self.last_email.as_deref())
    }

    /// Password to pre-fill at login, only ever taken from the environment.
    pub fn login_password(&self) -> Option<&str> {
        self.overrides.password.as_deref()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the token file and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build the configured credential store.
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_storage {
            TokenStorage::File => Arc::new(FileTokenStore::new(&self.data_dir()?)),
            TokenStorage::Keyring => Arc::new(KeyringTokenStore::new(self.backend_url())),
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"last_email": "admin@example.com"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_storage, TokenStorage::File);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.last_email.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn test_token_storage_names() {
        let config: Config = serde_json::from_str(r#"{"token_storage": "keyring"}"#).unwrap();
        assert_eq!(config.token_storage, TokenStorage::Keyring);
        assert!(serde_json::from_str::<Config>(r#"{"token_storage": "cookie"}"#).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            base_url: "https://blog.example.com/api".to_string(),
            token_storage: TokenStorage::Memory,
            request_timeout_secs: 5,
            last_email: Some("a@b.c".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, config.base_url);
        assert_eq!(loaded.token_storage, TokenStorage::Memory);
        assert_eq!(loaded.request_timeout_secs, 5);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://api.example.com/"),
            (ENV_EMAIL, "ops@example.com"),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            last_email: Some("admin@example.com".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend_url(), "https://api.example.com");
        assert_eq!(config.login_email(), Some("ops@example.com"));
        assert_eq!(config.login_password(), None);

        // Stored values are untouched
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.last_email.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn test_password_override() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == ENV_PASSWORD).then(|| "hunter2".to_string()));
        assert_eq!(config.login_password(), Some("hunter2"));
        assert_eq!(config.login_email(), None);
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.backend_url(), DEFAULT_BASE_URL);
        assert_eq!(config.login_email(), None);
    }

    #[test]
    fn test_overrides_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Config::default().save_to(&path).unwrap();

        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://staging.example.com"),
            (ENV_EMAIL, "ops@example.com"),
            (ENV_PASSWORD, "hunter2"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::load_from(&path).unwrap();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        config.last_email = Some("admin@example.com".to_string());
        config.save_to(&path).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("staging"));
        assert!(!saved.contains("hunter2"));

        let next = Config::load_from(&path).unwrap();
        assert_eq!(next.base_url, DEFAULT_BASE_URL);
        assert_eq!(next.backend_url(), DEFAULT_BASE_URL);
        assert_eq!(next.last_email.as_deref(), Some("admin@example.com"));
        assert_eq!(next.login_password(), None);
    }

    #[test]
    fn test_stored_url_is_normalized() {
        let config = Config {
            base_url: " https://blog.example.com/ ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.backend_url(), "https://blog.example.com");
    }
}
