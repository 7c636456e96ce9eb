//! Configuration management for linear-context.

use crate::error::{LinearError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Linear GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (or environment variable name if prefixed with $).
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_key() -> String {
    format!("${}", API_KEY_ENV)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: default_api_key(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LinearError::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("linear-context").join("config.toml"))
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the API key, failing when it is unset or empty.
    pub fn credential(&self) -> Result<String> {
        match resolve_env(&self.api_key) {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LinearError::Config(match self.api_key.strip_prefix('$') {
                Some(var) => format!("{} environment variable is not set", var),
                None => "api_key is empty".to_string(),
            })),
        }
    }
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> Option<String> {
    match value.strip_prefix('$') {
        Some(var_name) => match std::env::var(var_name) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Environment variable {} not set", var_name);
                None
            }
        },
        None => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_key, "$LINEAR_API_KEY");
    }

    #[test]
    fn test_literal_credential() {
        let config = Config {
            api_key: "lin_api_literal".to_string(),
            ..Config::default()
        };
        assert_eq!(config.credential().unwrap(), "lin_api_literal");
    }

    #[test]
    fn test_env_credential() {
        std::env::set_var("TEST_LINEAR_CONTEXT_KEY", "lin_api_from_env");
        let config = Config {
            api_key: "$TEST_LINEAR_CONTEXT_KEY".to_string(),
            ..Config::default()
        };
        assert_eq!(config.credential().unwrap(), "lin_api_from_env");
        std::env::remove_var("TEST_LINEAR_CONTEXT_KEY");
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let config = Config {
            api_key: "$NONEXISTENT_LINEAR_VAR_12345".to_string(),
            ..Config::default()
        };
        let err = config.credential().unwrap_err();
        assert!(matches!(err, LinearError::Config(_)));
        assert!(err.to_string().contains("NONEXISTENT_LINEAR_VAR_12345"));
    }

    #[test]
    fn test_empty_literal_credential() {
        let config = Config {
            api_key: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.credential().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/linear-context.toml")).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(r#"api_url = "http://example.test""#).unwrap();
        assert_eq!(config.api_url, "http://example.test");
        assert_eq!(config.api_key, "$LINEAR_API_KEY");
    }
}
