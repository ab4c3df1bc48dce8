//! Inbound order events.
//!
//! The commerce platform delivers each webhook with a topic (event kind), the
//! shop domain and a JSON order document. Only order creation is acted on;
//! every other topic is classified as [`EventKind::Other`].
//!
//! Parsing is deliberately lenient: missing fields fall back to defaults so a
//! degraded notification is sent rather than none. Only a body that is not a
//! JSON object is rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{SlackError, SlackResult};

/// Canonical topic name for order creation.
pub const ORDERS_CREATE_TOPIC: &str = "ORDERS_CREATE";

/// Total used when the payload carries none.
pub const DEFAULT_TOTAL_PRICE: &str = "0.00";

/// Kind of inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A new order was placed.
    OrderCreated,
    /// Any other topic (ignored, kept for logging).
    Other(String),
}

impl EventKind {
    /// Classify a topic string.
    ///
    /// Accepts both the enum form (`ORDERS_CREATE`) and the header form
    /// (`orders/create`), case-insensitively.
    pub fn from_topic(topic: &str) -> Self {
        let topic = topic.trim();
        let normalized = topic.replace('/', "_").to_ascii_uppercase();
        if normalized == ORDERS_CREATE_TOPIC {
            Self::OrderCreated
        } else {
            Self::Other(topic.to_string())
        }
    }

    /// Whether this service acts on the event.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::OrderCreated)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderCreated => f.write_str(ORDERS_CREATE_TOPIC),
            Self::Other(topic) => f.write_str(topic),
        }
    }
}

/// Order document as sent by the platform. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_price: Option<String>,
    #[serde(default)]
    pub line_items: Option<Vec<LineItemPayload>>,
}

/// Line item as sent by the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub variant_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
}

/// A parsed order-created event with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub kind: EventKind,
    pub tenant_id: String,
    pub order_id: Option<String>,
    /// Decimal string, `"0.00"` when absent.
    pub total_price: String,
    pub line_items: Vec<LineItem>,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub title: String,
    /// `None` when the platform sent no variant or an empty one.
    pub variant_title: Option<String>,
    /// Rendered as sent; `"0"` when absent.
    pub quantity: String,
    pub unit_price: String,
}

impl From<LineItemPayload> for LineItem {
    fn from(item: LineItemPayload) -> Self {
        Self {
            title: item.title.unwrap_or_default(),
            variant_title: item.variant_title.filter(|v| !v.trim().is_empty()),
            quantity: item.quantity.unwrap_or_else(|| "0".to_string()),
            unit_price: item
                .price
                .unwrap_or_else(|| DEFAULT_TOTAL_PRICE.to_string()),
        }
    }
}

impl OrderEvent {
    /// Build an order-created event from a decoded payload.
    pub fn from_payload(tenant_id: impl Into<String>, payload: OrderPayload) -> Self {
        Self {
            kind: EventKind::OrderCreated,
            tenant_id: tenant_id.into(),
            order_id: payload.id,
            total_price: payload
                .total_price
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOTAL_PRICE.to_string()),
            line_items: payload
                .line_items
                .unwrap_or_default()
                .into_iter()
                .map(LineItem::from)
                .collect(),
        }
    }
}

/// Parse a raw webhook body into an [`OrderEvent`].
///
/// # Errors
///
/// Returns [`SlackError::InvalidPayload`] when the body is not a JSON object
/// or a field has a structurally wrong type (e.g. `line_items` not a list).
pub fn parse_order_event(tenant_id: &str, body: &[u8]) -> SlackResult<OrderEvent> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SlackError::InvalidPayload(format!("Body is not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(SlackError::InvalidPayload(
            "Order payload must be a JSON object".to_string(),
        ));
    }

    let payload: OrderPayload = serde_json::from_value(value)
        .map_err(|e| SlackError::InvalidPayload(format!("Malformed order payload: {e}")))?;

    debug!(
        tenant_id,
        order_id = payload.id.as_deref().unwrap_or("-"),
        line_items = payload.line_items.as_ref().map_or(0, Vec::len),
        "Parsed order payload"
    );

    Ok(OrderEvent::from_payload(tenant_id, payload))
}

/// Strings pass through, numbers are rendered, anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers, or strings holding one. Whole floats lose their fraction
/// (`2.0` renders as `2`); anything else becomes `None`.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(render_number(&n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<serde_json::Number>()
            .ok()
            .map(|n| render_number(&n)),
        _ => None,
    })
}

fn render_number(n: &serde_json::Number) -> String {
    if n.is_u64() || n.is_i64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
