//! Hosted backend: artwork storage, order intake and contact messages.
//!
//! The storefront only consumes these as HTTP contracts. [`StorefrontBackend`]
//! is the seam: [`client::HttpBackend`] talks to the real service,
//! [`Unconfigured`] stands in when configuration is missing so every call
//! reports the missing variable instead of failing silently.

pub mod artwork;
pub mod client;
pub mod config;
pub mod contact;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::domain::aggregates::{OrderReceipt, OrderSubmission};
use artwork::{ArtworkUpload, StoredArtwork};
use config::ConfigError;
use contact::{ContactMessage, ContactReceipt};

pub use client::HttpBackend;
pub use config::BackendConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend configuration is missing or malformed.
    #[error("backend not configured: {0}")]
    Config(#[from] ConfigError),

    /// The request could not be sent or the response not read.
    #[error("request to backend failed: {0}")]
    Request(String),

    /// No response within the request timeout.
    #[error("backend did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be understood.
    #[error("unexpected backend response: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    async fn upload_artwork(&self, upload: &ArtworkUpload) -> Result<StoredArtwork, BackendError>;
    async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderReceipt, BackendError>;
    async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, BackendError>;
}

/// Runs a backend call with a hard deadline, so a hung request surfaces as
/// [`BackendError::Timeout`] instead of pending forever.
pub async fn bounded<T>(secs: u64, call: impl Future<Output = Result<T, BackendError>>) -> Result<T, BackendError> {
    tokio::time::timeout(Duration::from_secs(secs), call)
        .await
        .unwrap_or(Err(BackendError::Timeout { secs }))
}

/// Backend used when configuration is absent.
#[derive(Debug, Clone)]
pub struct Unconfigured { error: ConfigError }

impl Unconfigured {
    pub fn new(error: ConfigError) -> Self { Self { error } }
}

#[async_trait]
impl StorefrontBackend for Unconfigured {
    async fn upload_artwork(&self, _upload: &ArtworkUpload) -> Result<StoredArtwork, BackendError> {
        Err(BackendError::Config(self.error.clone()))
    }

    async fn submit_order(&self, _order: &OrderSubmission) -> Result<OrderReceipt, BackendError> {
        Err(BackendError::Config(self.error.clone()))
    }

    async fn submit_contact(&self, _message: &ContactMessage) -> Result<ContactReceipt, BackendError> {
        Err(BackendError::Config(self.error.clone()))
    }
}
