//! Configuration
//!
//! Thứ tự ưu tiên (thấp → cao): default → TOML file (`--config`) → env vars.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_prefix: String,
    pub api_version: String,
    pub log_level: String,
    pub upload_base_url: String,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "goldloan".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite:goldloan.db".to_string(),
            api_prefix: "/api/v1".to_string(),
            api_version: "v1".to_string(),
            log_level: "info".to_string(),
            upload_base_url: "https://s3-presigned".to_string(),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Default + environment variables
    pub fn from_env() -> Self {
        Self::default().with_env(|name| env::var(name).ok())
    }

    /// Default → file (nếu có) → environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env(|name| env::var(name).ok()))
    }

    /// Load config từ TOML file; field thiếu lấy giá trị default
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Ghi đè bằng env vars. Giá trị số không parse được thì giữ nguyên.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_NAME") {
            self.app_name = v;
        }
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = lookup("API_PREFIX") {
            self.api_prefix = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("UPLOAD_BASE_URL") {
            self.upload_base_url = v;
        }
        if let Some(n) = lookup("DB_MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
            self.max_connections = n;
        }
        self
    }

    /// Lấy địa chỉ bind đầy đủ
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.upload_base_url, "https://s3-presigned");
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml("port = 9000\ndatabase_url = \"sqlite::memory:\"").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.host, "127.0.0.1");

        assert!(AppConfig::from_toml("port = \"abc\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [("PORT", "7000"), ("DB_MAX_CONNECTIONS", "oops"), ("HOST", "0.0.0.0")]
            .into_iter()
            .collect();
        let config = AppConfig::from_toml("port = 9000\nmax_connections = 3")
            .unwrap()
            .with_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "0.0.0.0");
        // Giá trị không hợp lệ bị bỏ qua
        assert_eq!(config.max_connections, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file(Path::new("/nonexistent/goldloan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
