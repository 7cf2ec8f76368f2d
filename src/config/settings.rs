//! Configuration settings for the SIGEA agenda service.
//!
//! All deployment-specific values (bind address, store backend, API keys)
//! are injected here at startup; nothing is embedded in the code.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("sigea.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("sigea/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".sigea/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackendType::Json && self.store.data_dir.is_empty() {
            return Err(ConfigError::MissingField("store.data_dir".to_string()).into());
        }

        if self.auth.enabled && self.auth.api_keys.is_empty() {
            return Err(
                ConfigError::Invalid("auth is enabled but no api_keys are set".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Path of the JSON store file under the configured data directory.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.data_dir).join("sigea.json")
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP server.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend type: "memory" or "json".
    pub backend: StoreBackendType,
    /// Data directory for the JSON backend.
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendType::Json,
            data_dir: ".sigea".to_string(),
        }
    }
}

/// Store backend type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendType {
    Memory,
    Json,
}

impl Default for StoreBackendType {
    fn default() -> Self {
        StoreBackendType::Json
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require an API key on API routes.
    pub enabled: bool,
    /// Accepted API keys.
    pub api_keys: Vec<String>,
}
