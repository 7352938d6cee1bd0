//! Hosted backend configuration parsed from environment variables.

use thiserror::Error;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    #[error("{var} not set")]
    Missing { var: String },

    /// A variable is present but cannot be parsed.
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
    pub timeouts: BackendTimeouts,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"<redacted>")
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl BackendConfig {
    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_URL`: base URL of the hosted backend
    /// - `BACKEND_ANON_KEY`: public API key sent with every request
    ///
    /// Optional:
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 20
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 5
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = required(&lookup, "BACKEND_URL")?.trim_end_matches('/').to_string();
        let anon_key = required(&lookup, "BACKEND_ANON_KEY")?;
        let timeouts = BackendTimeouts {
            request_secs: parse_timeout(&lookup, "BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_timeout(&lookup, "BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        Ok(Self { base_url, anon_key, timeouts })
    }
}

pub(crate) fn required(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<String, ConfigError> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing { var: var.to_string() })
}

pub(crate) fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: u64) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid { var: var.to_string(), value: raw }),
    }
}

/// Like `parse_u64`, but 0 is invalid.
fn parse_timeout(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: u64) -> Result<u64, ConfigError> {
    match parse_u64(lookup, var, default)? {
        0 => Err(ConfigError::Invalid { var: var.to_string(), value: "0".to_string() }),
        secs => Ok(secs),
    }
}
