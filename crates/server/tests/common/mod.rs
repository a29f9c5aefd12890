//! Common test utilities for API testing with a mock torrent source.
//!
//! This module provides a test fixture that creates an in-process router
//! wired to a `MockTorrentSource`, so taxonomy cycles can be driven
//! deterministically through the HTTP API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

use taxonomy_core::{
    testing::MockTorrentSource, ClientGateway, Config, GatewayConfig, TaxonomyService,
};
use taxonomy_server::api::{create_router, WsBroadcaster, WsMessage};
use taxonomy_server::state::AppState;

/// Re-export fixtures for test convenience
pub use taxonomy_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_refresh() {
///     let fixture = TestFixture::new().await;
///     fixture.source.set_torrents(vec![fixtures::torrent("a")]).await;
///
///     let response = fixture.post("/api/v1/torrents/refresh").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock torrent source - control what the next cycle lists
    pub source: Arc<MockTorrentSource>,
    /// Subscription to the broadcaster, taken before any cycle ran
    pub ws_rx: tokio::sync::broadcast::Receiver<WsMessage>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with a mock source and no polling.
    pub async fn new() -> Self {
        Self::build(true)
    }

    /// Create a fixture without any torrent source configured.
    pub async fn without_source() -> Self {
        Self::build(false)
    }

    fn build(with_source: bool) -> Self {
        let source = Arc::new(MockTorrentSource::new());
        let ws_broadcaster = WsBroadcaster::new(16);
        let ws_rx = ws_broadcaster.subscribe();

        let mut taxonomy = TaxonomyService::new();
        taxonomy.on_taxonomy_change(ws_broadcaster.change_handler());
        let taxonomy = Arc::new(RwLock::new(taxonomy));

        // The gateway is never started; tests drive cycles via the refresh endpoint.
        let gateway = with_source.then(|| {
            ClientGateway::new(
                Arc::clone(&source) as Arc<dyn taxonomy_core::TorrentSource>,
                Arc::clone(&taxonomy),
                &GatewayConfig::default(),
            )
        });

        let state = Arc::new(AppState::new(
            Config::default(),
            taxonomy,
            gateway,
            ws_broadcaster,
        ));

        Self {
            router: create_router(state),
            source,
            ws_rx,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
