//! HTTP client for integration testing.
//!
//! Drives the real router in-process through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

/// Response of a single request: status plus parsed JSON body.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Client bound to one application router.
#[derive(Clone)]
pub struct ApiClient {
    app: Router,
}

impl ApiClient {
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, Body::empty()).await
    }

    pub async fn delete(&self, uri: &str) -> ApiResponse {
        self.send(Method::DELETE, uri, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> ApiResponse {
        self.send(Method::POST, uri, Body::from(body.to_string())).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> ApiResponse {
        self.send(Method::PUT, uri, Body::from(body.to_string())).await
    }

    /// Send a raw body, e.g. malformed JSON.
    pub async fn send_raw(&self, method: Method, uri: &str, body: &'static str) -> ApiResponse {
        self.send(method, uri, Body::from(body)).await
    }

    /// Send a request and return the raw response, headers included.
    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> ApiResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .expect("valid request");

        let response = self.request(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };

        ApiResponse { status, body }
    }
}
