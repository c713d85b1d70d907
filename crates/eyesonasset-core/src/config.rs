//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend location, login wire format, route table, session lifetime
//! fallback and where the session is kept.
//!
//! Configuration is stored at `~/.config/eyesonasset/config.json`.
//! Missing fields take their defaults, so a partial file is fine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::session::DEFAULT_SESSION_LIFETIME_SECS;
use crate::auth::{FileStorage, KeyValueStorage, KeyringStorage, LoginEncoding};
use crate::routing::RouteConfig;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "eyesonasset";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

const DEFAULT_AUTH_ENDPOINT: &str = "/integrations/auth";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Overrides `api_base_url`
pub const ENV_API_URL: &str = "EYESONASSET_API_URL";

/// Pre-fills the login identifier
pub const ENV_USERNAME: &str = "EYESONASSET_USERNAME";

/// Pre-fills the login password
pub const ENV_PASSWORD: &str = "EYESONASSET_PASSWORD";

/// Where the session record is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_endpoint: String,
    pub login_encoding: LoginEncoding,
    pub routes: RouteConfig,
    pub session_fallback_secs: u64,
    pub storage: StorageBackend,
    pub request_timeout_secs: u64,
    /// Last login name, to pre-fill the form. Passwords are never stored.
    pub last_identifier: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            login_encoding: LoginEncoding::default(),
            routes: RouteConfig::default(),
            session_fallback_secs: DEFAULT_SESSION_LIFETIME_SECS,
            storage: StorageBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_identifier: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
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

    /// Apply environment overrides (call after loading `.env`)
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(ENV_API_URL).ok());
    }

    fn apply_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "API base URL overridden from environment");
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            anyhow::bail!("api_base_url must be an http(s) URL, got {:?}", self.api_base_url);
        }
        if !self.auth_endpoint.starts_with('/') {
            anyhow::bail!("auth_endpoint must start with '/'");
        }
        if self.session_fallback_secs == 0 {
            anyhow::bail!("session_fallback_secs must be positive");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        self.routes.validate().context("Invalid route configuration")
    }

    /// Open the configured session storage backend
    pub fn open_storage(&self, cache_dir: &Path) -> Arc<dyn KeyValueStorage> {
        match self.storage {
            StorageBackend::File => Arc::new(FileStorage::new(cache_dir)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
        }
    }
}
