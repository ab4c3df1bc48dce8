//! Shop identity for admin requests.
//!
//! The authenticating proxy in front of the service resolves the merchant
//! session and forwards the shop domain in `X-Shopify-Shop-Domain`.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::error::AppError;

/// Header carrying the shop domain.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Header carrying the webhook topic.
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Read a non-empty, trimmed header value.
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Authenticated shop making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSession {
    pub shop: String,
}

impl<S> FromRequestParts<S> for ShopSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(&parts.headers, SHOP_DOMAIN_HEADER)
            .map(|shop| ShopSession {
                shop: shop.to_ascii_lowercase(),
            })
            .ok_or_else(|| AppError::Authentication("Missing shop session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    async fn extract(request: Request<()>) -> Result<ShopSession, AppError> {
        let (mut parts, _) = request.into_parts();
        ShopSession::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_session_from_header() {
        let request = Request::builder()
            .header(SHOP_DOMAIN_HEADER, " Shop-A.myshopify.com ")
            .body(())
            .unwrap();
        let session = extract(request).await.unwrap();
        assert_eq!(session.shop, "shop-a.myshopify.com");
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_rejected() {
        let err = extract(Request::builder().body(()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        let mut request = Request::builder().body(()).unwrap();
        request
            .headers_mut()
            .insert(SHOP_DOMAIN_HEADER, HeaderValue::from_static("   "));
        assert!(extract(request).await.is_err());
    }
}
