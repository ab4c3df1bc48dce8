//! Message formatting for Slack incoming webhooks.
//!
//! Output is plain text with Slack's control characters escaped. The layout:
//!
//! ```text
//! 🛒 New order
//! 💵 Total: $42.50
//! 📦 Items:
//! - Widget (Red) x2 – $10.00
//! ```

use serde::{Deserialize, Serialize};

use crate::events::{LineItem, OrderEvent};

/// Variant label used when an item has none.
pub const DEFAULT_VARIANT: &str = "Default Variant";

/// Line emitted in place of the item list for orders without items.
pub const NO_ITEMS: &str = "No items found";

/// Body of an incoming-webhook POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub text: String,
}

impl WebhookMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Escape the three characters Slack treats as control sequences.
///
/// # Example
///
/// ```rust
/// use shopbell_slack::messages::escape_text;
///
/// assert_eq!(escape_text("Salt & <Pepper>"), "Salt &amp; &lt;Pepper&gt;");
/// ```
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format one line item: `- <title> (<variant>) x<quantity> – $<price>`.
pub fn format_line_item(item: &LineItem) -> String {
    format!(
        "- {} ({}) x{} – ${}",
        escape_text(&item.title),
        escape_text(item.variant_title.as_deref().unwrap_or(DEFAULT_VARIANT)),
        escape_text(&item.quantity),
        escape_text(&item.unit_price),
    )
}

/// Format the full notification text for an order. Pure and deterministic.
pub fn format_order_message(event: &OrderEvent) -> String {
    let items = if event.line_items.is_empty() {
        NO_ITEMS.to_string()
    } else {
        event
            .line_items
            .iter()
            .map(format_line_item)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "🛒 New order\n💵 Total: ${}\n📦 Items:\n{}",
        escape_text(&event.total_price),
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use pretty_assertions::assert_eq;

    fn event(total: &str, items: Vec<LineItem>) -> OrderEvent {
        OrderEvent {
            kind: EventKind::OrderCreated,
            tenant_id: "shop-a".to_string(),
            order_id: Some("1".to_string()),
            total_price: total.to_string(),
            line_items: items,
        }
    }

    fn item(title: &str, variant: Option<&str>, quantity: u64, price: &str) -> LineItem {
        LineItem {
            title: title.to_string(),
            variant_title: variant.map(str::to_string),
            quantity: quantity.to_string(),
            unit_price: price.to_string(),
        }
    }

    #[test]
    fn test_format_order_message_layout() {
        let text = format_order_message(&event(
            "42.50",
            vec![item("Widget", Some("Red"), 2, "10.00")],
        ));
        assert_eq!(
            text,
            "🛒 New order\n💵 Total: $42.50\n📦 Items:\n- Widget (Red) x2 – $10.00"
        );
        assert!(text.contains("$42.50"));
        assert!(text.lines().any(|l| l == "- Widget (Red) x2 – $10.00"));
    }

    #[test]
    fn test_format_no_items() {
        let text = format_order_message(&event("0.00", vec![]));
        assert!(text.ends_with("📦 Items:\nNo items found"));
    }

    #[test]
    fn test_format_default_variant() {
        let text = format_order_message(&event("5.00", vec![item("Mug", None, 1, "5.00")]));
        assert!(text.contains("- Mug (Default Variant) x1 – $5.00"));
    }

    #[test]
    fn test_format_keeps_item_order() {
        let text = format_order_message(&event(
            "30.00",
            vec![
                item("First", None, 1, "10.00"),
                item("Second", Some("L"), 2, "10.00"),
            ],
        ));
        let lines: Vec<&str> = text.lines().skip(3).collect();
        assert_eq!(
            lines,
            vec![
                "- First (Default Variant) x1 – $10.00",
                "- Second (L) x2 – $10.00"
            ]
        );
    }

    #[test]
    fn test_format_escapes_control_characters() {
        let text = format_order_message(&event(
            "1.00",
            vec![item("<!channel> & co", None, 1, "1.00")],
        ));
        assert!(text.contains("- &lt;!channel&gt; &amp; co (Default Variant)"));
    }

    #[test]
    fn test_format_is_deterministic() {
        let e = event("9.99", vec![item("A", Some("B"), 3, "3.33")]);
        assert_eq!(format_order_message(&e), format_order_message(&e));
    }

    #[test]
    fn test_webhook_message_serializes_text_only() {
        let message = WebhookMessage::new("hello");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"text": "hello"})
        );
    }
}
