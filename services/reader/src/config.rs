//! services/reader/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub storage_root: PathBuf,
    pub namespace: String,
    pub max_uploaded_files: usize,
    pub log_level: Level,
    /// Declared for the planned chat panel; consumed by no implemented logic.
    pub grok_api_key: Option<String>,
    /// Declared for planned remote sync; consumed by no implemented logic.
    pub supabase_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Storage Settings ---
        let storage_root = std::env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.reader-store"));

        let namespace =
            std::env::var("STORE_NAMESPACE").unwrap_or_else(|_| "epub-reader".to_string());

        let max_files_str =
            std::env::var("MAX_UPLOADED_FILES").unwrap_or_else(|_| "10".to_string());
        let max_uploaded_files = max_files_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_UPLOADED_FILES".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let grok_api_key = std::env::var("GROK_API_KEY").ok();
        let supabase_url = std::env::var("SUPABASE_URL").ok();

        Ok(Self {
            storage_root,
            namespace,
            max_uploaded_files,
            log_level,
            grok_api_key,
            supabase_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single test so concurrent test threads never race on the process
    // environment.
    #[test]
    fn from_env_applies_defaults_and_rejects_bad_values() {
        std::env::remove_var("STORAGE_ROOT");
        std::env::remove_var("STORE_NAMESPACE");
        std::env::remove_var("MAX_UPLOADED_FILES");
        std::env::remove_var("RUST_LOG");

        let config = Config::from_env().expect("defaults should load");
        assert_eq!(config.storage_root, PathBuf::from("./.reader-store"));
        assert_eq!(config.namespace, "epub-reader");
        assert_eq!(config.max_uploaded_files, 10);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.grok_api_key.is_none());

        std::env::set_var("MAX_UPLOADED_FILES", "not-a-number");
        let err = Config::from_env().expect_err("bad count should fail");
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "MAX_UPLOADED_FILES"));
        std::env::remove_var("MAX_UPLOADED_FILES");

        std::env::set_var("RUST_LOG", "noisy");
        let err = Config::from_env().expect_err("bad level should fail");
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RUST_LOG"));
        std::env::remove_var("RUST_LOG");
    }
}
