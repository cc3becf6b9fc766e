//! Config Module - Configuration management

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_ms: 30000,
        }
    }
}

/// Which repository implementation backs the service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "sqlite://patients.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:8080".to_string()],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: RwLock<Config>,
    config_path: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            config_path: None,
        }
    }

    /// Load from file
    pub async fn load(&mut self, path: &str) -> Result<(), String> {
        let content = tokio::fs::read_to_string(path).await
            .map_err(|e| format!("Failed to read config: {}", e))?;

        let config: Config = if path.ends_with(".toml") {
            toml::from_str(&content).map_err(|e| format!("Invalid TOML: {}", e))?
        } else if path.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| format!("Invalid JSON: {}", e))?
        } else {
            return Err("Unsupported config format".to_string());
        };

        let mut cfg = self.config.write().await;
        *cfg = config;
        self.config_path = Some(path.to_string());

        Ok(())
    }

    /// Get current config
    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Path the config was loaded from, if any
    pub fn path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// Validate config
    pub async fn validate(&self) -> Result<(), Vec<String>> {
        let config = self.config.read().await;
        let mut errors = Vec::new();

        if config.server.port == 0 {
            errors.push("Invalid server port".to_string());
        }

        if config.server.request_timeout_ms == 0 {
            errors.push("request_timeout_ms must be > 0".to_string());
        }

        if config.storage.backend == StorageBackend::Sqlite {
            if config.storage.database_url.trim().is_empty() {
                errors.push("database_url is required for the sqlite backend".to_string());
            }
            if config.storage.max_connections == 0 {
                errors.push("max_connections must be > 0".to_string());
            }
        }

        if config.logging.level.parse::<tracing::Level>().is_err() {
            errors.push(format!("Unknown log level: {}", config.logging.level));
        }

        if !matches!(config.logging.format.as_str(), "text" | "json") {
            errors.push(format!("Unknown log format: {}", config.logging.format));
        }

        for origin in &config.cors.allowed_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                errors.push(format!("Invalid CORS origin: {}", origin));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Export config as TOML
    pub async fn export_toml(&self) -> Result<String, String> {
        let config = self.config.read().await;
        toml::to_string_pretty(&*config)
            .map_err(|e| format!("Failed to serialize: {}", e))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
