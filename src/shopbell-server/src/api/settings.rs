//! Per-shop notification settings.

use std::sync::Arc;

use axum::{Form, Json, extract::State};
use tracing::info;

use crate::error::AppResult;
use crate::session::ShopSession;
use crate::state::{AppState, counters};

use super::types::{Ack, SettingsForm, SettingsResponse};

/// Current webhook URL and last delivery status for the shop.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    session: ShopSession,
) -> AppResult<Json<SettingsResponse>> {
    let settings = state.store.settings(&session.shop).await?;
    let (url, last_delivery) = settings
        .map(|s| (s.notification_url.unwrap_or_default(), s.last_delivery))
        .unwrap_or_default();

    Ok(Json(SettingsResponse {
        slack_webhook_url: url,
        last_delivery,
    }))
}

/// Save the webhook URL submitted from the settings form.
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    session: ShopSession,
    Form(form): Form<SettingsForm>,
) -> AppResult<Json<Ack>> {
    state
        .store
        .set(&session.shop, &form.slack_webhook_url)
        .await?;
    state.increment_counter(counters::SETTINGS_UPDATED).await;
    info!(shop = %session.shop, "Notification settings updated");

    Ok(Json(Ack::ok()))
}
