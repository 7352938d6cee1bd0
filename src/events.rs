//! Domain event fan-out: every event is logged, and published on NATS when
//! a connection is available.

use crate::domain::events::DomainEvent;

pub const SUBJECT_PREFIX: &str = "storefront";

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    /// Log-only publisher.
    pub fn disabled() -> Self { Self::default() }

    pub fn subject(event: &DomainEvent) -> String { format!("{SUBJECT_PREFIX}.{}", event.subject()) }

    /// Must be called from within a tokio runtime when NATS is configured.
    pub fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let subject = Self::subject(&event);
            tracing::info!(subject = %subject, event = ?event, "domain event");
            let Some(nats) = self.nats.clone() else { continue };
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize domain event");
                    continue;
                }
            };
            tokio::spawn(async move {
                if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
                    tracing::warn!(subject = %subject, error = %e, "failed to publish domain event");
                }
            });
        }
    }
}
