//! Service configuration.

use crate::backend::config::{parse_u64, ConfigError};
use crate::backend::BackendConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub nats_url: Option<String>,
    pub session_idle_minutes: u64,
    /// Kept as a `Result` so the service can start without a backend and
    /// report the missing variable on each backend call.
    pub backend: Result<BackendConfig, ConfigError>,
}

impl AppConfig {
    /// Reads `PORT`, `NATS_URL`, `SESSION_IDLE_MINUTES` and the backend variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid { var: "PORT".into(), value: raw })?,
        };
        let nats_url = lookup("NATS_URL").map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let session_idle_minutes = parse_u64(&lookup, "SESSION_IDLE_MINUTES", DEFAULT_SESSION_IDLE_MINUTES)?.max(1);
        let backend = BackendConfig::from_lookup(&lookup);
        Ok(Self { port, nats_url, session_idle_minutes, backend })
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.backend.as_ref().map_or(crate::backend::config::DEFAULT_REQUEST_TIMEOUT_SECS, |b| b.timeouts.request_secs)
    }
}
