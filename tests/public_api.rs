//! Public API surface tests.
//!
//! Exercises the crate the way an embedding application would: build a
//! client with a custom transport, issue calls through the convenience
//! methods, and branch on the normalized response.

#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use reqflow::prelude::*;
use reqflow::transport::{Transport, TransportReply, TransportRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Transport that answers every request with a canned JSON body.
struct CannedTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: TransportRequest) -> reqflow::Result<TransportReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.url.starts_with("https://"));
        let body = Bytes::from_static(br#"{"status":"ok"}"#);
        Ok(TransportReply {
            status: 200,
            headers: HashMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: Box::pin(stream::iter(vec![Ok(body)])),
        })
    }
}

fn canned_client() -> (NetClient, Arc<CannedTransport>) {
    let transport = Arc::new(CannedTransport {
        calls: AtomicUsize::new(0),
    });
    let client = NetClient::builder().transport(transport.clone()).build();
    (client, transport)
}

#[tokio::test]
async fn get_round_trip_through_public_api() {
    let (client, transport) = canned_client();

    let response = client
        .get("https://api.example.com/health", &RequestConfig::default())
        .await;
    assert!(response.success);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.json().unwrap()["status"], "ok");
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn post_with_json_body() {
    let (client, _transport) = canned_client();

    let config = RequestConfig::default().with_header("X-Request-Id", "abc-123");
    let response = client
        .post(
            "https://api.example.com/items",
            br#"{"name":"widget"}"#.to_vec(),
            "application/json",
            &config,
        )
        .await;
    assert!(response.success);
}

#[tokio::test]
async fn failed_validation_is_a_response_not_a_panic() {
    let (client, transport) = canned_client();

    let response = client
        .get("not a url", &RequestConfig::default())
        .await;
    assert!(!response.success);
    assert_eq!(response.status_code, 0);
    assert!(!response.error_message.is_empty());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn background_dispatch_through_channel() {
    let (client, _transport) = canned_client();

    let config = RequestConfig {
        background: true,
        ..Default::default()
    };
    let rx = client.execute_spawned(
        Method::GET,
        "https://api.example.com/async",
        None,
        None,
        &config,
    );
    let response = rx.await.expect("dispatch task dropped the channel");
    assert!(response.success);
}

#[tokio::test]
async fn clones_share_lifecycle() {
    let (client, _transport) = canned_client();
    let worker = client.clone();

    client.close().await;
    let response = worker
        .get("https://api.example.com/late", &RequestConfig::default())
        .await;
    assert!(!response.success);
    assert!(response.error_message.contains("closed"));
}

#[tokio::test(start_paused = true)]
async fn rate_limited_calls_are_spaced() {
    let (client, _transport) = canned_client();
    let config = RequestConfig {
        rate_limit_per_minute: 30,
        ..Default::default()
    };

    let start = tokio::time::Instant::now();
    for _ in 0..3 {
        let response = client.get("https://api.example.com/limited", &config).await;
        assert!(response.success);
    }
    // 30 per minute means 2 seconds between admissions.
    assert!(start.elapsed() >= Duration::from_secs(4));
}
