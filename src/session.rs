//! Session-scoped storefront state.
//!
//! Every browser session owns one cart, one design draft and one checkout.
//! Sessions live in memory behind their own mutex and expire after a period
//! of inactivity.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::backend::{bounded, StorefrontBackend};
use crate::domain::aggregates::{Cart, Catalog, OrderReceipt, ProductError};
use crate::domain::checkout::Checkout;
use crate::domain::design::DesignDraft;
use crate::domain::events::DomainEvent;
use crate::events::EventPublisher;
use crate::StorefrontError;

#[derive(Debug, Clone)]
pub struct Session {
    cart: Cart,
    pub design: DesignDraft,
    pub checkout: Checkout,
    last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(catalog: &Catalog) -> Result<Self, ProductError> {
        Ok(Self { cart: Cart::new(), design: DesignDraft::new(catalog)?, checkout: Checkout::new(), last_seen: Utc::now() })
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn last_seen(&self) -> DateTime<Utc> { self.last_seen }
    pub fn touch(&mut self) { self.last_seen = Utc::now(); }

    /// The cart is frozen while its contents are out for submission.
    pub fn cart_mut(&mut self) -> Result<&mut Cart, StorefrontError> {
        if self.checkout.is_submitting() {
            return Err(StorefrontError::CartLocked);
        }
        Ok(&mut self.cart)
    }

    /// Visibility only; allowed even while the cart is frozen.
    pub fn set_cart_open(&mut self, open: bool) { self.cart.set_open(open); }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = self.cart.take_events();
        events.extend(self.checkout.take_events());
        events
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    idle: chrono::Duration,
}

impl SessionStore {
    pub fn new(idle_minutes: u64) -> Self {
        let minutes = i64::try_from(idle_minutes.min(MAX_IDLE_MINUTES)).unwrap_or(1);
        Self { sessions: RwLock::new(HashMap::new()), idle: chrono::Duration::minutes(minutes) }
    }

    pub async fn create(&self, catalog: &Catalog) -> Result<(Uuid, SharedSession), ProductError> {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(catalog)?));
        self.sessions.write().await.insert(id, session.clone());
        tracing::info!(session = %id, "session created");
        Ok((id, session))
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize { self.sessions.read().await.len() }

    /// Drops sessions idle since before `now - idle`. A session whose lock is
    /// held is in use and survives the sweep.
    pub async fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| match session.try_lock() {
            Ok(s) if s.last_seen() < cutoff => {
                tracing::info!(session = %id, last_seen = %s.last_seen(), "session expired");
                false
            }
            _ => true,
        });
        before - sessions.len()
    }
}

/// Upper bound for the idle limit, about one year.
const MAX_IDLE_MINUTES: u64 = 525_600;

/// Submits the session's checkout to the backend.
///
/// The session lock is held only to start and to settle the submission, never
/// across the network call. The call is bounded by `timeout_secs`; on any
/// failure the checkout returns to the payment step with the message recorded
/// and the cart untouched.
pub async fn submit_checkout(
    session: &Mutex<Session>,
    backend: &dyn StorefrontBackend,
    timeout_secs: u64,
    events: &EventPublisher,
) -> Result<OrderReceipt, StorefrontError> {
    let submission = {
        let mut guard = session.lock().await;
        let s = &mut *guard;
        s.touch();
        s.checkout.begin_submission(&s.cart)?
    };
    tracing::info!(
        lines = submission.items.len(),
        total = %submission.total_amount,
        shipping = ?submission.shipping_method,
        payment = ?submission.payment_method,
        "submitting order"
    );

    let outcome = bounded(timeout_secs, backend.submit_order(&submission)).await;

    let mut guard = session.lock().await;
    let s = &mut *guard;
    let result = match outcome {
        Ok(receipt) => {
            s.checkout.complete(receipt.clone(), &mut s.cart)?;
            tracing::info!(order_id = %receipt.order_id, "order submitted");
            Ok(receipt)
        }
        Err(e) => {
            tracing::warn!(error = %e, "order submission failed");
            s.checkout.fail(e.to_string());
            Err(e.into())
        }
    };
    events.publish(s.take_events());
    result
}
