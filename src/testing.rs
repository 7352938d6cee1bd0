//! In-memory backend for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::artwork::{ArtworkUpload, StoredArtwork};
use crate::backend::contact::{ContactMessage, ContactReceipt};
use crate::backend::{BackendError, StorefrontBackend};
use crate::domain::aggregates::{OrderReceipt, OrderSubmission};

#[derive(Default)]
pub struct FakeBackend {
    /// Number of upcoming order submissions to reject.
    pub failing_orders: AtomicUsize,
    /// Artificial latency for order submissions.
    pub order_delay: Option<Duration>,
    pub orders: Mutex<Vec<OrderSubmission>>,
    pub uploads: Mutex<Vec<String>>,
    pub contacts: Mutex<Vec<ContactMessage>>,
}

impl FakeBackend {
    pub fn failing(times: usize) -> Self {
        Self { failing_orders: AtomicUsize::new(times), ..Self::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { order_delay: Some(delay), ..Self::default() }
    }

    pub fn order_count(&self) -> usize { self.orders.lock().unwrap().len() }
}

#[async_trait]
impl StorefrontBackend for FakeBackend {
    async fn upload_artwork(&self, upload: &ArtworkUpload) -> Result<StoredArtwork, BackendError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload.file_name().to_string());
        Ok(StoredArtwork {
            public_url: format!("https://cdn.test/artwork/{}-{}", uploads.len(), upload.file_name()),
            path: Some(format!("artwork/{}", upload.file_name())),
        })
    }

    async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderReceipt, BackendError> {
        if let Some(delay) = self.order_delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.failing_orders.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_orders.store(remaining - 1, Ordering::SeqCst);
            return Err(BackendError::Rejected { status: 500, message: "Failed to create order".into() });
        }
        let mut orders = self.orders.lock().unwrap();
        orders.push(order.clone());
        Ok(OrderReceipt { order_id: format!("NYH{:04}", orders.len()) })
    }

    async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactReceipt, BackendError> {
        let mut contacts = self.contacts.lock().unwrap();
        contacts.push(message.clone());
        Ok(ContactReceipt { id: Some(contacts.len().to_string()) })
    }
}
