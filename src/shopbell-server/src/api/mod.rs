//! HTTP routes and handlers.

mod health;
mod settings;
pub mod types;
mod webhooks;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub use types::{Ack, HealthResponse, SettingsResponse};

/// Admin API routes, nested under `/api/v1`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::get_metrics))
        .route(
            "/settings",
            get(settings::get_settings).post(settings::save_settings),
        )
}

/// Inbound webhook routes.
pub fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks", post(webhooks::receive_webhook))
        .route("/webhooks/orders/create", post(webhooks::receive_orders_create))
}
