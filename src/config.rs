//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Where the local session identity is kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/billsplit/billsplit.db".to_string()
}

fn default_session_path() -> String {
    "~/.local/share/billsplit/session.yaml".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./billsplit.yaml (current directory)
    /// 3. ~/.config/billsplit/billsplit.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "billsplit.yaml".to_string(),
            shellexpand::tilde("~/.config/billsplit/billsplit.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        expand(&self.database.path)
    }

    /// Get the session file path, expanding ~ to home directory
    pub fn session_path(&self) -> PathBuf {
        expand(&self.session.path)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "warn");
        assert!(config.database.path.ends_with("billsplit.db"));
        assert!(config.session.path.ends_with("session.yaml"));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
database:
  path: /tmp/billsplit/test.db

logging:
  level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/billsplit/test.db"));
        assert_eq!(config.logging.level, "debug");
        // Missing sections fall back to defaults
        assert_eq!(config.session.path, default_session_path());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "session:\n  path: /tmp/s.yaml\n").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.session_path(), PathBuf::from("/tmp/s.yaml"));
    }
}
