//! Nyhavn Print - storefront session service

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nyhavn_print::backend::{HttpBackend, StorefrontBackend, Unconfigured};
use nyhavn_print::config::AppConfig;
use nyhavn_print::domain::aggregates::Catalog;
use nyhavn_print::events::EventPublisher;
use nyhavn_print::routes::{self, AppState};
use nyhavn_print::session::SessionStore;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let backend: Arc<dyn StorefrontBackend> = match config.backend.clone() {
        Ok(backend) => {
            tracing::info!(url = %backend.base_url, timeout_secs = backend.timeouts.request_secs, "backend configured");
            Arc::new(HttpBackend::new(backend)?)
        }
        Err(e) => {
            tracing::warn!(error = %e, "backend not configured; uploads, orders and contact messages will fail");
            Arc::new(Unconfigured::new(e))
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => {
                tracing::info!(url = %url, "publishing domain events to NATS");
                Some(client)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "NATS unavailable; domain events are only logged");
                None
            }
        },
        None => None,
    };

    let catalog = Arc::new(Catalog::storefront()?);
    let sessions = Arc::new(SessionStore::new(config.session_idle_minutes));
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let expired = sweeper.sweep_idle(chrono::Utc::now()).await;
            if expired > 0 {
                tracing::debug!(expired, "idle sessions swept");
            }
        }
    });

    let state = AppState {
        catalog,
        sessions,
        backend,
        events: EventPublisher::new(nats),
        request_timeout_secs: config.request_timeout_secs(),
    };
    let app = routes::router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    tracing::info!("Nyhavn Print listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
