//! Settings, health and metrics endpoints.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use shopbell_server::api::SettingsResponse;
use shopbell_server::config::StorageBackendKind;
use shopbell_server::{AppState, ServerConfig, create_router_with_state};
use tower::ServiceExt;

const SHOP: &str = "shop-a.myshopify.com";
const URL: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

async fn app() -> Router {
    let state = AppState::new(ServerConfig::default()).await.unwrap();
    create_router_with_state(Arc::new(state))
}

fn get_settings(shop: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/v1/settings");
    if let Some(shop) = shop {
        builder = builder.header("X-Shopify-Shop-Domain", shop);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_settings(shop: &str, webhook_url: &str) -> Request<Body> {
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("slackWebhookUrl", webhook_url)
        .finish();
    Request::builder()
        .method("POST")
        .uri("/api/v1/settings")
        .header("X-Shopify-Shop-Domain", shop)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unset_settings_render_empty_url() {
    let response = app().await.oneshot(get_settings(Some(SHOP))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let settings: SettingsResponse = json(response).await;
    assert_eq!(settings.slack_webhook_url, "");
    assert!(settings.last_delivery.is_none());
}

#[tokio::test]
async fn test_save_then_read_settings() {
    let app = app().await;

    let response = app.clone().oneshot(post_settings(SHOP, URL)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack: serde_json::Value = json(response).await;
    assert_eq!(ack, serde_json::json!({"success": true}));

    let response = app.clone().oneshot(get_settings(Some(SHOP))).await.unwrap();
    let settings: SettingsResponse = json(response).await;
    assert_eq!(settings.slack_webhook_url, URL);

    // Other shops are unaffected
    let response = app
        .oneshot(get_settings(Some("shop-b.myshopify.com")))
        .await
        .unwrap();
    let settings: SettingsResponse = json(response).await;
    assert_eq!(settings.slack_webhook_url, "");
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let app = app().await;

    for bad in ["", "   ", "not a url", "https://example.com/hook"] {
        let response = app.clone().oneshot(post_settings(SHOP, bad)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "url {bad:?}"
        );
        let body: serde_json::Value = json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
    }

    let response = app.oneshot(get_settings(Some(SHOP))).await.unwrap();
    let settings: SettingsResponse = json(response).await;
    assert_eq!(settings.slack_webhook_url, "");
}

#[tokio::test]
async fn test_settings_require_shop_session() {
    let response = app().await.oneshot(get_settings(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = json(response).await;
    assert_eq!(body["error"]["code"], "authentication_failed");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health: serde_json::Value = json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage_backend"], "memory");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let metrics: serde_json::Value = json(response).await;
    assert_eq!(metrics["deliveries_failed"], 0);
}

#[tokio::test]
async fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default();
    config.storage.backend = StorageBackendKind::File;
    config.storage.data_dir = dir.path().to_path_buf();

    let first = create_router_with_state(Arc::new(AppState::new(config.clone()).await.unwrap()));
    let response = first.oneshot(post_settings(SHOP, URL)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second = create_router_with_state(Arc::new(AppState::new(config).await.unwrap()));
    let response = second.oneshot(get_settings(Some(SHOP))).await.unwrap();
    let settings: SettingsResponse = json(response).await;
    assert_eq!(settings.slack_webhook_url, URL);
}
