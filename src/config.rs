//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const STORAGE_DIR_NAME: &str = "addressbook";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("no data directory available; set ADDRESSBOOK_STORAGE_DIR")]
    NoStorageDir,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base path without a trailing slash, e.g. `http://host/api`.
    pub base_url: String,
    /// Fixed per-request timeout.
    pub timeout: Duration,
    /// Directory holding the local storage file.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Validate and normalize configuration values.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the base URL is not an absolute http(s)
    /// URL or the timeout is zero.
    pub fn new(base_url: &str, timeout: Duration, storage_dir: PathBuf) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("timeout must be greater than zero".into()));
        }
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { base_url, timeout, storage_dir })
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `ADDRESSBOOK_BASE_URL`: default `http://127.0.0.1:5000/api`
    /// - `ADDRESSBOOK_TIMEOUT_MS`: default 5000
    /// - `ADDRESSBOOK_STORAGE_DIR`: default `<data dir>/addressbook`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable values or when no storage
    /// directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("ADDRESSBOOK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let timeout_ms = match std::env::var("ADDRESSBOOK_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(format!("ADDRESSBOOK_TIMEOUT_MS={raw}")))?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };
        let storage_dir = match std::env::var_os("ADDRESSBOOK_STORAGE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_storage_dir()?,
        };
        Self::new(&base_url, Duration::from_millis(timeout_ms), storage_dir)
    }
}

/// Platform data directory joined with [`STORAGE_DIR_NAME`].
///
/// # Errors
///
/// Returns [`ConfigError::NoStorageDir`] when the platform has no data
/// directory for the current user.
pub fn default_storage_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir().map(|dir| dir.join(STORAGE_DIR_NAME)).ok_or(ConfigError::NoStorageDir)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!("{trimmed}: scheme must be http or https")));
    }
    Ok(trimmed.to_owned())
}
