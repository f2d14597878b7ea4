//! Server configuration for dashboard-server
//!
//! Loads and parses the dashboard-server.toml configuration file with
//! server, database, GitHub, and classifier settings. Secrets (the GitHub
//! token and the model API key) come from the environment, never the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(toml::de::Error),
}

/// Server identification and bind address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file path
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// GitHub search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Term the issue search looks for
    #[serde(default = "default_search_term")]
    pub search_term: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            search_term: default_search_term(),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the model API
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_classifier_model")]
    pub model: String,
    /// Issues per classification batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Minimum seconds between batch starts
    #[serde(default = "default_batch_interval_secs")]
    pub batch_interval_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_classifier_base_url(),
            model: default_classifier_model(),
            batch_size: default_batch_size(),
            batch_interval_secs: default_batch_interval_secs(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Server identification and bind address
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// GitHub search configuration
    #[serde(default)]
    pub github: GitHubConfig,
    /// Classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadError)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    /// Load configuration from the default locations.
    ///
    /// Searches, in order: the CONFIG_PATH environment variable, then
    /// ./config/dashboard-server.toml, then ./dashboard-server.toml.
    /// Returns None when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        if let Ok(config_path) = std::env::var("CONFIG_PATH") {
            return Self::from_file(config_path).map(Some);
        }

        let paths = [
            PathBuf::from("config/dashboard-server.toml"),
            PathBuf::from("dashboard-server.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::from_file(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Get database URL from configuration
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database.path)
    }
}

fn default_server_name() -> String {
    "dashboard-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database_path() -> String {
    "dashboard.db".to_string()
}

fn default_search_term() -> String {
    "sqlancer".to_string()
}

fn default_classifier_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_classifier_model() -> String {
    // GPT-4o would exceed the tokens-per-minute limit even at tier 3.
    "gpt-4o-mini".to_string()
}

fn default_batch_size() -> usize {
    200
}

fn default_batch_interval_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_content = r#"
[server]
name = "dashboard-server"
host = "0.0.0.0"
port = 8080

[database]
path = "data/dashboard.db"

[github]
search_term = "sqlancer"

[classifier]
model = "gpt-4o-mini"
batch_size = 100
batch_interval_secs = 30
"#;

        let config = DashboardConfig::from_str(toml_content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/dashboard.db");
        assert_eq!(config.github.search_term, "sqlancer");
        assert_eq!(config.classifier.batch_size, 100);
        assert_eq!(config.classifier.batch_interval_secs, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = DashboardConfig::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.path, "dashboard.db");
        assert_eq!(config.classifier.model, "gpt-4o-mini");
        assert_eq!(config.classifier.batch_size, 200);
    }

    #[test]
    fn test_database_url() {
        let config = DashboardConfig::default();
        assert_eq!(config.database_url(), "sqlite://dashboard.db?mode=rwc");
    }
}
