//! # Client Configuration
//!
//! Configuration for the client facade. Supports config files in standard
//! locations plus environment variable overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Port assumed when none is configured.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

fn default_port() -> u16 {
    DEFAULT_HTTPS_PORT
}

/// Client identity and instance-level headers
///
/// # Examples
///
/// ```rust
/// use acorn_client::config::ClientConfig;
///
/// let config = ClientConfig::for_host("api.example.com");
/// assert_eq!(config.port, 443);
/// assert!(config.headers.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target host, without scheme. Mandatory: client construction fails on
    /// an empty host.
    pub host: String,
    /// Target port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Headers applied to every request issued through the client
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_HTTPS_PORT,
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Configuration for a host with default port and no headers
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables and config file
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (~/.acorn/config.toml and friends)
    /// 3. Default values
    pub fn load() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            debug!("Loading config from: {}", config_path.display());
            match Self::load_from_file(&config_path) {
                Ok(file_config) => config = file_config,
                Err(e) => {
                    debug!("Failed to load config file: {}", e);
                    // Continue with defaults if config file fails
                }
            }
        }

        config.apply_env_overrides();

        debug!("Loaded client configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config_error(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ClientError::config_error(format!("Failed to parse config file: {e}")))?;

        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let possible_paths = [
            // Current directory
            Path::new("./acorn-client.toml"),
            Path::new("./config/acorn-client.toml"),
            // User home directory
            &dirs::home_dir()?.join(".acorn").join("config.toml"),
            &dirs::config_dir()?.join("acorn").join("client.toml"),
        ];

        for path in &possible_paths {
            if path.exists() && path.is_file() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ACORN_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("ACORN_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::config_error(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config_error(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ClientError::config_error(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> ClientResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".acorn").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.host.is_empty());
        assert_eq!(config.port, DEFAULT_HTTPS_PORT);
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = ClientConfig::for_host("api.example.com");
        config
            .headers
            .insert("Accept".to_string(), "application/json".to_string());

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ClientConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.host, deserialized.host);
        assert_eq!(config.port, deserialized.port);
        assert_eq!(config.headers, deserialized.headers);
    }

    #[test]
    fn test_port_defaults_when_absent() {
        let config: ClientConfig = toml::from_str(r#"host = "api.example.com""#).unwrap();
        assert_eq!(config.port, DEFAULT_HTTPS_PORT);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test-config.toml");

        let original_config = ClientConfig::for_host("api.example.com");
        original_config.save_to_file(&config_path).unwrap();

        let loaded_config = ClientConfig::load_from_file(&config_path).unwrap();
        assert_eq!(original_config.host, loaded_config.host);
        assert_eq!(original_config.port, loaded_config.port);
    }
}
