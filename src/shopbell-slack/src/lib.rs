//! Slack notifications for Shopbell.
//!
//! This crate turns an "order created" webhook from the commerce platform
//! into a Slack incoming-webhook message:
//! - [`events`]: topic classification and lenient order payload parsing
//! - [`messages`]: deterministic plain-text formatting
//! - [`webhook`]: single-attempt HTTP delivery with an explicit timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use shopbell_slack::{WebhookClient, WebhookOptions, format_order_message, parse_order_event};
//!
//! let event = parse_order_event("shop-a.myshopify.com", body)?;
//! let client = WebhookClient::new(WebhookOptions::default())?;
//! let outcome = client.deliver(&url, &format_order_message(&event)).await;
//! ```

pub mod error;
pub mod events;
pub mod messages;
pub mod webhook;

// Re-export main types
pub use error::{SlackError, SlackResult};
pub use events::{
    EventKind, LineItem, ORDERS_CREATE_TOPIC, OrderEvent, OrderPayload, parse_order_event,
};
pub use messages::{WebhookMessage, format_order_message};
pub use webhook::{DeliveryOutcome, WebhookClient, WebhookOptions, redact_url};
