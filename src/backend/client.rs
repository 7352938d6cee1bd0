//! HTTP client for the hosted backend's functions.
//!
//! Thin wrapper around `reqwest`; response handling lives in the pure
//! `parse_*` functions so it can be tested without a server.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::artwork::{ArtworkUpload, StoredArtwork};
use super::config::BackendConfig;
use super::contact::{ContactMessage, ContactReceipt};
use super::{BackendError, StorefrontBackend};
use crate::domain::aggregates::{OrderReceipt, OrderSubmission};

const SUBMIT_ORDER: &str = "submit-order";
const SUBMIT_CONTACT: &str = "submit-contact-form";
const UPLOAD_ARTWORK: &str = "upload-artwork";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, function: &str) -> String {
        format!("{}/functions/v1/{function}", self.config.base_url)
    }

    async fn post<B: Serialize + ?Sized>(&self, function: &str, body: &B) -> Result<(u16, String), BackendError> {
        let response = self
            .http
            .post(self.endpoint(function))
            .bearer_auth(&self.config.anon_key)
            .header("apikey", &self.config.anon_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;
        Ok((status, text))
    }

    fn transport_error(&self, e: &reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout { secs: self.config.timeouts.request_secs }
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    async fn upload_artwork(&self, upload: &ArtworkUpload) -> Result<StoredArtwork, BackendError> {
        let (status, body) = self.post(UPLOAD_ARTWORK, &upload.to_request()).await?;
        let stored = parse_upload(status, &body)?;
        tracing::info!(file = upload.file_name(), bytes = upload.len(), url = %stored.public_url, "artwork uploaded");
        Ok(stored)
    }

    async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderReceipt, BackendError> {
        let (status, body) = self.post(SUBMIT_ORDER, order).await?;
        parse_order(status, &body)
    }

    async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, BackendError> {
        let (status, body) = self.post(SUBMIT_CONTACT, message).await?;
        parse_contact(status, &body)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderAck {
    #[serde(default)]
    success: bool,
    order_id: Option<String>,
    email_status: Option<EmailStatus>,
}

#[derive(Deserialize)]
struct EmailStatus {
    customer: bool,
    business: bool,
}

#[derive(Deserialize)]
struct ContactAck {
    #[serde(default)]
    success: bool,
    id: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadAck {
    #[serde(default)]
    success: bool,
    public_url: Option<String>,
    path: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Splits non-success statuses into [`BackendError::Rejected`] with the
/// backend's own message when it sent one; decodes the body otherwise.
fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, BackendError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| match (b.error, b.details) {
                (Some(e), Some(d)) => Some(format!("{e}: {d}")),
                (e, _) => e,
            })
            .unwrap_or_else(|| format!("backend returned status {status}"));
        return Err(BackendError::Rejected { status, message });
    }
    serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))
}

pub(crate) fn parse_order(status: u16, body: &str) -> Result<OrderReceipt, BackendError> {
    let ack: OrderAck = parse_body(status, body)?;
    if !ack.success {
        return Err(BackendError::Rejected { status, message: "order was not accepted".into() });
    }
    if let Some(email) = ack.email_status {
        if !email.customer || !email.business {
            tracing::warn!(customer = email.customer, business = email.business, "order confirmation email not delivered");
        }
    }
    // The order exists at this point; a missing id must not invite a resubmit.
    let order_id = ack.order_id.unwrap_or_else(|| {
        tracing::warn!("backend accepted order without an order id");
        "Unknown".to_string()
    });
    Ok(OrderReceipt { order_id })
}

pub(crate) fn parse_contact(status: u16, body: &str) -> Result<ContactReceipt, BackendError> {
    let ack: ContactAck = parse_body(status, body)?;
    if !ack.success {
        return Err(BackendError::Rejected { status, message: "message was not accepted".into() });
    }
    let id = ack.id.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    });
    Ok(ContactReceipt { id })
}

pub(crate) fn parse_upload(status: u16, body: &str) -> Result<StoredArtwork, BackendError> {
    let ack: UploadAck = parse_body(status, body)?;
    match ack.public_url {
        Some(public_url) if ack.success => Ok(StoredArtwork { public_url, path: ack.path }),
        _ => Err(BackendError::Parse("upload response without public URL".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::BackendTimeouts;

    #[test]
    fn order_success() {
        let body = r#"{"success":true,"message":"Order processed successfully","orderId":"NYHABC123","emailStatus":{"customer":true,"business":false}}"#;
        assert_eq!(parse_order(200, body).unwrap(), OrderReceipt { order_id: "NYHABC123".into() });
    }

    #[test]
    fn order_error_uses_backend_message() {
        let err = parse_order(400, r#"{"error":"Missing required customer information"}"#).unwrap_err();
        assert_eq!(err, BackendError::Rejected { status: 400, message: "Missing required customer information".into() });
    }

    #[test]
    fn error_details_are_appended() {
        let err = parse_upload(500, r#"{"error":"Failed to upload file","details":"bucket not found"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload file: bucket not found");
    }

    #[test]
    fn non_json_error_body() {
        let err = parse_order(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, BackendError::Rejected { status: 502, message: "backend returned status 502".into() });
    }

    #[test]
    fn success_without_flag_is_rejected() {
        assert!(matches!(parse_order(200, r#"{"orderId":"X"}"#), Err(BackendError::Rejected { .. })));
        assert!(matches!(parse_order(200, "not json"), Err(BackendError::Parse(_))));
    }

    #[test]
    fn missing_order_id_still_succeeds() {
        assert_eq!(parse_order(200, r#"{"success":true}"#).unwrap().order_id, "Unknown");
    }

    #[test]
    fn contact_id_forms() {
        assert_eq!(parse_contact(200, r#"{"success":true,"id":42}"#).unwrap().id.as_deref(), Some("42"));
        assert_eq!(parse_contact(200, r#"{"success":true,"id":"a-b"}"#).unwrap().id.as_deref(), Some("a-b"));
        assert_eq!(parse_contact(200, r#"{"success":true}"#).unwrap().id, None);
    }

    #[test]
    fn upload_success() {
        let stored = parse_upload(200, r#"{"success":true,"publicUrl":"https://cdn.test/artwork/1.png","path":"artwork/1.png"}"#).unwrap();
        assert_eq!(stored.public_url, "https://cdn.test/artwork/1.png");
        assert_eq!(stored.path.as_deref(), Some("artwork/1.png"));
        assert!(parse_upload(200, r#"{"success":true}"#).is_err());
    }

    #[test]
    fn endpoints_join_base_url() {
        let backend = HttpBackend::new(BackendConfig {
            base_url: "https://abc.example.co".into(),
            anon_key: "k".into(),
            timeouts: BackendTimeouts::default(),
        })
        .unwrap();
        assert_eq!(backend.endpoint(SUBMIT_ORDER), "https://abc.example.co/functions/v1/submit-order");
    }
}
