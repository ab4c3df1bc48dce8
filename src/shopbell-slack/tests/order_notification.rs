//! Parse → format → deliver against a mock incoming webhook.

use shopbell_slack::{
    DeliveryOutcome, WebhookClient, WebhookOptions, format_order_message, parse_order_event,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_order_payload_reaches_webhook_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T0/B0/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let body = serde_json::json!({
        "id": 450789469,
        "total_price": "42.50",
        "line_items": [
            {"title": "Widget", "variant_title": "Red", "quantity": 2, "price": "10.00"},
            {"title": "Gadget", "variant_title": null, "quantity": 1, "price": "22.50"}
        ]
    });
    let event = parse_order_event("shop-a.myshopify.com", body.to_string().as_bytes())
        .expect("valid payload");
    let text = format_order_message(&event);

    let client = WebhookClient::new(WebhookOptions::default()).expect("client");
    let outcome = client
        .deliver(&format!("{}/services/T0/B0/abc", server.uri()), &text)
        .await;
    assert_eq!(outcome, DeliveryOutcome::Delivered { status: 200 });

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let sent_text = sent["text"].as_str().expect("text field");
    assert!(sent_text.contains("$42.50"));
    assert!(sent_text.contains("- Widget (Red) x2 – $10.00"));
    assert!(sent_text.contains("- Gadget (Default Variant) x1 – $22.50"));
}

#[tokio::test]
async fn test_order_without_items_still_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let event = parse_order_event("shop-a", br#"{"id": 1}"#).expect("valid payload");
    let text = format_order_message(&event);
    assert!(text.contains("No items found"));
    assert!(text.contains("$0.00"));

    let client = WebhookClient::new(WebhookOptions::default()).expect("client");
    assert!(client.deliver(&server.uri(), &text).await.is_delivered());
}
