//! Stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification settings for a single shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Shop identifier, e.g. `shop-a.myshopify.com`.
    pub tenant_id: String,
    /// Slack incoming-webhook URL, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    /// Outcome of the most recent delivery attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_delivery: Option<DeliveryRecord>,
    /// Last time the record was written.
    pub updated_at: DateTime<Utc>,
}

impl TenantSettings {
    /// Create an empty record for a shop.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            notification_url: None,
            last_delivery: None,
            updated_at: Utc::now(),
        }
    }

    /// Builder-style setter for the webhook URL.
    pub fn with_notification_url(mut self, url: impl Into<String>) -> Self {
        self.notification_url = Some(url.into());
        self
    }
}

/// Whether a delivery attempt reached the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

/// Record of a single outbound delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// HTTP status returned by the destination, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// A successful delivery.
    pub fn delivered(order_id: Option<String>, http_status: u16) -> Self {
        Self {
            status: DeliveryStatus::Delivered,
            order_id,
            http_status: Some(http_status),
            error: None,
            attempted_at: Utc::now(),
        }
    }

    /// A failed delivery. `http_status` is `None` for network-level failures.
    pub fn failed(
        order_id: Option<String>,
        http_status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            order_id,
            http_status,
            error: Some(error.into()),
            attempted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_skip_empty_fields() {
        let settings = TenantSettings::new("shop-a");
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("notification_url").is_none());
        assert!(json.get("last_delivery").is_none());
    }

    #[test]
    fn test_delivery_record_camel_case() {
        let record = DeliveryRecord::failed(Some("42".into()), Some(500), "HTTP 500");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["httpStatus"], 500);
        assert_eq!(json["orderId"], "42");
    }
}
