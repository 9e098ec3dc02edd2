//! Application configuration (TOML-based)
//!
//! Loaded from `$OCPP_CONFIG` or the user config directory; any missing
//! file or section falls back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

/// WebSocket listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL.
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./ocpp_central.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default tracing filter, overridable via `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// `~/.config/ocpp-central/config.toml` (or the platform equivalent).
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocpp-central")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.address(), "localhost:8080");
        assert!(cfg.database.url.starts_with("sqlite://"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_files_fall_back_per_section() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "localhost");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn full_file_parses() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8443

            [database]
            url = "sqlite::memory:"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.address(), "0.0.0.0:8443");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.logging.level, "debug");
    }
}
