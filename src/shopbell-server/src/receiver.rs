//! Inbound event handling.
//!
//! One inbound event yields at most one outbound delivery. The flow is
//! kind check, settings lookup, parse, format, deliver, then a best-effort
//! record of the delivery result on the tenant's settings.

use std::sync::Arc;

use shopbell_slack::{
    DeliveryOutcome, EventKind, SlackError, WebhookClient, format_order_message,
    parse_order_event,
};
use shopbell_storage::{ConfigStore, DeliveryRecord, StorageError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// An inbound event as received over HTTP.
#[derive(Debug, Clone, Copy)]
pub struct InboundEvent<'a> {
    /// Topic as sent by the platform.
    pub topic: &'a str,
    /// Shop domain the event belongs to.
    pub tenant_id: &'a str,
    /// Raw order document.
    pub body: &'a [u8],
}

/// What happened to an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Topic is not one this service acts on.
    IgnoredKind(EventKind),
    /// Tenant has no destination configured.
    Unconfigured,
    /// Notification sent.
    Delivered { status: u16 },
    /// Notification attempted but not accepted by the destination.
    DeliveryFailed { status: Option<u16>, error: String },
}

/// Failures that prevented a delivery attempt.
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("Invalid order payload: {0}")]
    Payload(#[from] SlackError),

    #[error("Settings lookup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Routes order events to the tenant's configured destination.
#[derive(Debug, Clone)]
pub struct EventReceiver {
    store: Arc<ConfigStore>,
    client: WebhookClient,
}

impl EventReceiver {
    pub fn new(store: Arc<ConfigStore>, client: WebhookClient) -> Self {
        Self { store, client }
    }

    /// Handle one inbound event.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiveError`] when the settings lookup fails or the order
    /// body cannot be decoded. Delivery failures are not errors; they come
    /// back as [`ReceiveOutcome::DeliveryFailed`].
    pub async fn handle(&self, event: InboundEvent<'_>) -> Result<ReceiveOutcome, ReceiveError> {
        let kind = EventKind::from_topic(event.topic);
        if !kind.is_handled() {
            debug!(tenant_id = event.tenant_id, topic = %kind, "Ignoring unhandled topic");
            return Ok(ReceiveOutcome::IgnoredKind(kind));
        }

        debug!(
            tenant_id = event.tenant_id,
            payload = %String::from_utf8_lossy(event.body),
            "Received order event"
        );

        let Some(url) = self.store.get(event.tenant_id).await? else {
            info!(tenant_id = event.tenant_id, "No notification URL configured");
            return Ok(ReceiveOutcome::Unconfigured);
        };

        let order = parse_order_event(event.tenant_id, event.body)?;
        let text = format_order_message(&order);

        let outcome = self.client.deliver(&url, &text).await;
        let record = match &outcome {
            DeliveryOutcome::Delivered { status } => {
                DeliveryRecord::delivered(order.order_id.clone(), *status)
            }
            DeliveryOutcome::Failed { status, error } => {
                DeliveryRecord::failed(order.order_id.clone(), *status, error.clone())
            }
        };

        if let Err(e) = self.store.record_delivery(event.tenant_id, record).await {
            warn!(tenant_id = event.tenant_id, error = %e, "Failed to record delivery status");
        }

        Ok(match outcome {
            DeliveryOutcome::Delivered { status } => {
                info!(
                    tenant_id = event.tenant_id,
                    order_id = order.order_id.as_deref().unwrap_or("-"),
                    "Order notification delivered"
                );
                ReceiveOutcome::Delivered { status }
            }
            DeliveryOutcome::Failed { status, error } => {
                ReceiveOutcome::DeliveryFailed { status, error }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopbell_slack::WebhookOptions;
    use shopbell_storage::{DeliveryStatus, MemoryBackend, WebhookUrlPolicy};

    const ORDER: &[u8] =
        br#"{"id": 7, "total_price": "19.99", "line_items": [{"title": "Mug", "quantity": 1, "price": "19.99"}]}"#;

    fn receiver() -> (EventReceiver, Arc<ConfigStore>) {
        let store = Arc::new(ConfigStore::new(
            Arc::new(MemoryBackend::new()),
            WebhookUrlPolicy::any_http(),
        ));
        let client = WebhookClient::new(WebhookOptions::default()).unwrap();
        (EventReceiver::new(store.clone(), client), store)
    }

    fn event<'a>(topic: &'a str, body: &'a [u8]) -> InboundEvent<'a> {
        InboundEvent {
            topic,
            tenant_id: "shop-a.myshopify.com",
            body,
        }
    }

    #[tokio::test]
    async fn test_ignored_kind_makes_no_call() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (receiver, store) = receiver();
        store
            .set("shop-a.myshopify.com", &server.uri())
            .await
            .unwrap();

        let outcome = receiver
            .handle(event("APP_UNINSTALLED", ORDER))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReceiveOutcome::IgnoredKind(EventKind::Other("APP_UNINSTALLED".into()))
        );
    }

    #[tokio::test]
    async fn test_unconfigured_tenant() {
        let (receiver, _) = receiver();
        let outcome = receiver
            .handle(event("orders/create", ORDER))
            .await
            .unwrap();
        assert_eq!(outcome, ReceiveOutcome::Unconfigured);
    }

    #[tokio::test]
    async fn test_delivery_is_recorded() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (receiver, store) = receiver();
        store
            .set("shop-a.myshopify.com", &server.uri())
            .await
            .unwrap();

        let outcome = receiver
            .handle(event("ORDERS_CREATE", ORDER))
            .await
            .unwrap();
        assert_eq!(outcome, ReceiveOutcome::Delivered { status: 200 });

        let settings = store
            .settings("shop-a.myshopify.com")
            .await
            .unwrap()
            .unwrap();
        let last = settings.last_delivery.unwrap();
        assert_eq!(last.status, DeliveryStatus::Delivered);
        assert_eq!(last.order_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_an_outcome() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (receiver, store) = receiver();
        store
            .set("shop-a.myshopify.com", &server.uri())
            .await
            .unwrap();

        let outcome = receiver
            .handle(event("orders/create", ORDER))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ReceiveOutcome::DeliveryFailed {
                status: Some(500),
                ..
            }
        ));

        let last = store
            .settings("shop-a.myshopify.com")
            .await
            .unwrap()
            .unwrap()
            .last_delivery
            .unwrap();
        assert_eq!(last.status, DeliveryStatus::Failed);
        assert_eq!(last.http_status, Some(500));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (receiver, store) = receiver();
        store
            .set("shop-a.myshopify.com", &server.uri())
            .await
            .unwrap();

        let err = receiver
            .handle(event("orders/create", b"{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReceiveError::Payload(_)));
    }
}
