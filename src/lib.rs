//! Nyhavn Print storefront
//!
//! Print-on-demand garments: pick a T-shirt or hoodie, place your own artwork
//! on it, and order it.
//!
//! ## Features
//! - Cart with per-variant line merging and derived totals
//! - Design canvas that keeps artwork inside the printable area
//! - Three-step checkout with timeout-bounded order submission
//! - Artwork upload and contact form through the hosted backend
//! - Session-scoped state served over a JSON API

pub mod backend;
pub mod config;
pub mod domain;
pub mod events;
pub mod routes;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use backend::artwork::ArtworkError;
use backend::config::ConfigError;
use backend::BackendError;
use domain::aggregates::ProductError;
use domain::checkout::{CheckoutError, FieldError};
use domain::value_objects::QuantityError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Cart cannot change while an order is being submitted")]
    CartLocked,

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Invalid fields: {}", .0.iter().map(|e| e.field.as_str()).collect::<Vec<_>>().join(", "))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Artwork(#[from] ArtworkError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self { Self::Validation(domain::checkout::field_errors(&errors)) }
}

impl From<ConfigError> for StorefrontError {
    fn from(error: ConfigError) -> Self { Self::Backend(BackendError::Config(error)) }
}

impl StorefrontError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound | Self::Product(ProductError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
            Self::CartLocked => StatusCode::CONFLICT,
            Self::Product(_) | Self::Quantity(_) | Self::Artwork(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(CheckoutError::Validation(_) | CheckoutError::EmptyCart) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Checkout(CheckoutError::WrongStep(_) | CheckoutError::AlreadySubmitting) => StatusCode::CONFLICT,
            Self::Backend(BackendError::Config(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Backend(BackendError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Backend(BackendError::Request(_) | BackendError::Rejected { .. } | BackendError::Parse(_)) => StatusCode::BAD_GATEWAY,
            Self::Backend(BackendError::HttpClientBuild(_)) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fields(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(fields) | Self::Checkout(CheckoutError::Validation(fields)) => Some(fields.as_slice()),
            _ => None,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = match self.fields() {
            Some(fields) => json!({ "error": self.to_string(), "fields": fields }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
