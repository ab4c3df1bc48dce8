//! Inbound platform webhooks.
//!
//! Every response carries an [`Ack`]. Anything that was understood is
//! acknowledged with 200, including ignored topics, shops without a
//! destination and failed deliveries, so the platform does not redeliver.
//! A body over the size limit gets the extractor's status with a failed
//! [`Ack`]. Only bodies that cannot be processed produce a 500.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode},
};
use shopbell_slack::{EventKind, ORDERS_CREATE_TOPIC};
use tracing::{error, warn};

use crate::receiver::{InboundEvent, ReceiveOutcome};
use crate::session::{SHOP_DOMAIN_HEADER, TOPIC_HEADER, header_value};
use crate::state::{AppState, counters};

use super::types::Ack;

/// Webhook response.
pub type WebhookResponse = (StatusCode, Json<Ack>);

/// Generic endpoint; the topic comes from the header.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> WebhookResponse {
    let topic = header_value(&headers, TOPIC_HEADER).unwrap_or_default();
    dispatch(&state, topic, &headers, body).await
}

/// Order-creation endpoint; a missing topic header means order creation.
pub async fn receive_orders_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> WebhookResponse {
    let topic = header_value(&headers, TOPIC_HEADER).unwrap_or(ORDERS_CREATE_TOPIC);
    dispatch(&state, topic, &headers, body).await
}

async fn dispatch(
    state: &AppState,
    topic: &str,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> WebhookResponse {
    state.increment_counter(counters::WEBHOOKS_RECEIVED).await;

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.increment_counter(counters::ERRORS).await;
            warn!(topic, error = %rejection, "Webhook body rejected");
            return (rejection.status(), Json(Ack::failed(rejection.body_text())));
        }
    };

    // Unhandled kinds need no tenant
    if !EventKind::from_topic(topic).is_handled() {
        state.increment_counter(counters::WEBHOOKS_IGNORED).await;
        return (StatusCode::OK, Json(Ack::ok()));
    }

    let Some(shop) = header_value(headers, SHOP_DOMAIN_HEADER) else {
        warn!(topic, "Webhook without shop domain");
        return (
            StatusCode::BAD_REQUEST,
            Json(Ack::failed("Missing shop domain header")),
        );
    };
    let tenant_id = shop.to_ascii_lowercase();

    let event = InboundEvent {
        topic,
        tenant_id: &tenant_id,
        body: &body,
    };

    match state.receiver.handle(event).await {
        Ok(outcome) => {
            let counter = match outcome {
                ReceiveOutcome::IgnoredKind(_) => counters::WEBHOOKS_IGNORED,
                ReceiveOutcome::Unconfigured => counters::WEBHOOKS_UNCONFIGURED,
                ReceiveOutcome::Delivered { .. } => counters::DELIVERIES_SUCCEEDED,
                ReceiveOutcome::DeliveryFailed { .. } => counters::DELIVERIES_FAILED,
            };
            state.increment_counter(counter).await;
            (StatusCode::OK, Json(Ack::ok()))
        }
        Err(e) => {
            state.increment_counter(counters::ERRORS).await;
            error!(tenant_id = %tenant_id, topic, error = %e, "Webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Ack::failed(e.to_string())),
            )
        }
    }
}
