//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::CART_STORAGE_KEY;
use crate::infrastructure::api::DEFAULT_BASE_URL;

/// Cart configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    /// json-server `db.json` used instead of the HTTP API when set
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Memory,
    JsonFile,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json-file" | "json" | "file" => Ok(Self::JsonFile),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::InvalidValue(format!("unknown storage backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_seconds: Some(10),
            },
            storage: StorageConfig {
                backend: StorageBackend::JsonFile,
                path: PathBuf::from("rocketshoes-storage.json"),
                key: default_storage_key(),
            },
            catalog: None,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Override fields from `CART_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CART_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(backend) = std::env::var("CART_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => tracing::warn!("Ignoring CART_STORAGE_BACKEND: {}", e),
            }
        }

        if let Ok(path) = std::env::var("CART_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        if let Ok(key) = std::env::var("CART_STORAGE_KEY") {
            self.storage.key = key;
        }

        if let Ok(catalog) = std::env::var("CART_CATALOG") {
            self.catalog = Some(PathBuf::from(catalog));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_none() && self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api.base-url is empty".to_string()));
        }
        if self.storage.key.is_empty() {
            return Err(ConfigError::InvalidValue("storage.key is empty".to_string()));
        }
        Ok(())
    }
}
