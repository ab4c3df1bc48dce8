//! Shopbell Server - order webhooks in, Slack notifications out.
//!
//! This crate provides:
//! - Inbound webhook endpoints for order events
//! - Per-shop settings API for the notification URL
//! - Health checks and metrics
//!
//! Each accepted order-creation event is formatted and delivered once to the
//! shop's configured incoming webhook.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod receiver;
pub mod session;
pub mod state;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use receiver::{EventReceiver, InboundEvent, ReceiveError, ReceiveOutcome};
pub use state::AppState;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
///
/// Once `shutdown` resolves, in-flight requests get `shutdown_timeout`
/// seconds to finish.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let state = Arc::new(AppState::new(config.clone()).await?);
    if !state.store.is_durable() {
        warn!("Settings are kept in memory and will be lost on restart");
    }
    let app = create_router_with_state(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Starting Shopbell server on {}", addr);

    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = stopping_tx.send(true);
        })
        .into_future();

    let grace = config.shutdown_timeout_duration();
    let drain_deadline = async move {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result?,
        () = drain_deadline => {
            warn!(timeout_secs = grace.as_secs(), "Graceful shutdown timed out, dropping open connections");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .nest("/api/v1", api::routes())
        .merge(api::webhook_routes())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
