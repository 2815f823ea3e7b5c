//! Configuration module for the facdir client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote directory store API
    pub api_base_url: String,
    /// Optional bearer token sent with every request
    pub api_token: Option<String>,
    /// Path to the SQLite cache database file
    pub cache_path: PathBuf,
    /// Total request attempts for transient transport errors (minimum 1)
    pub retry_attempts: u32,
    /// Linear backoff base in milliseconds (attempt N sleeps N * base)
    pub retry_backoff_ms: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("FACDIR_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/api".to_string());

        let api_token = env::var("FACDIR_API_TOKEN").ok();

        let cache_path = env::var("FACDIR_CACHE_PATH")
            .unwrap_or_else(|_| "./data/cache.sqlite".to_string())
            .into();

        let retry_attempts = env::var("FACDIR_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .expect("Invalid FACDIR_RETRY_ATTEMPTS format")
            .max(1);

        let retry_backoff_ms = env::var("FACDIR_RETRY_BACKOFF_MS")
            .unwrap_or_else(|_| "250".to_string())
            .parse()
            .expect("Invalid FACDIR_RETRY_BACKOFF_MS format");

        let log_level = env::var("FACDIR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_base_url,
            api_token,
            cache_path,
            retry_attempts,
            retry_backoff_ms,
            log_level,
        }
    }
}
