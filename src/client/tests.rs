//! Orchestration tests against a scripted transport.
//!
//! All timing-sensitive tests run on a paused tokio clock, so sleeps
//! resolve instantly and elapsed-time assertions are exact.

use crate::client::NetClient;
use crate::config::{ClientConfig, RequestConfig};
use crate::error::{Error, Result};
use crate::rate_limiter::RateLimitMode;
use crate::transport::{Transport, TransportReply, TransportRequest};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct MockReply {
    status: u16,
    body: Vec<u8>,
    delay: Duration,
}

struct RecordedRequest {
    url: String,
    headers: HeaderMap,
    at: Instant,
}

/// Transport double that answers from a scripted queue and records
/// every attempt. An empty queue answers 200 with an empty body.
struct MockTransport {
    script: Mutex<VecDeque<Result<MockReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn push_status(&self, status: u16) {
        self.push(Ok(MockReply {
            status,
            body: Vec::new(),
            delay: Duration::ZERO,
        }));
    }

    fn push_body(&self, status: u16, body: &[u8]) {
        self.push(Ok(MockReply {
            status,
            body: body.to_vec(),
            delay: Duration::ZERO,
        }));
    }

    fn push_delayed(&self, status: u16, delay: Duration) {
        self.push(Ok(MockReply {
            status,
            body: Vec::new(),
            delay,
        }));
    }

    fn push_error(&self, err: Error) {
        self.push(Err(err));
    }

    fn push(&self, entry: Result<MockReply>) {
        self.script.lock().unwrap().push_back(entry);
    }

    fn attempt_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn attempt_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|r| r.at).collect()
    }

    fn last_url(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.url.clone())
            .unwrap_or_default()
    }

    fn last_headers(&self) -> HeaderMap {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.headers.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportReply> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url,
            headers: request.headers,
            at: Instant::now(),
        });
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(MockReply {
                status: 200,
                body: Vec::new(),
                delay: Duration::ZERO,
            }));
        let reply = next?;
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        Ok(TransportReply {
            status: reply.status,
            headers: HashMap::new(),
            body: Box::pin(stream::iter(vec![Ok(Bytes::from(reply.body))])),
        })
    }
}

fn client_with(mock: Arc<MockTransport>) -> NetClient {
    NetClient::builder().transport(mock).build()
}

#[tokio::test]
async fn success_flow_returns_body() {
    let mock = MockTransport::new();
    mock.push_body(200, b"hello");
    let client = client_with(mock.clone());

    let resp = client.get("https://example.com/status", &RequestConfig::default()).await;
    assert!(resp.success);
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.text(), "hello");
    assert!(resp.error_message.is_empty());
    assert_eq!(mock.attempt_count(), 1);
    assert_eq!(mock.last_url(), "https://example.com/status");
}

#[tokio::test(start_paused = true)]
async fn retries_server_errors_until_success() {
    let mock = MockTransport::new();
    mock.push_status(500);
    mock.push_status(502);
    mock.push_body(200, b"ok");
    let client = client_with(mock.clone());

    let resp = client.get("https://example.com/a", &RequestConfig::default()).await;
    assert!(resp.success);
    assert_eq!(mock.attempt_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn retries_exhausted_surface_server_error() {
    let mock = MockTransport::new();
    for _ in 0..4 {
        mock.push_status(500);
    }
    let client = client_with(mock.clone());

    let resp = client.get("https://example.com/a", &RequestConfig::default()).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code, 500);
    assert_eq!(resp.error_message, "Server error (status 500)");
    // Default policy: one initial attempt plus three retries.
    assert_eq!(mock.attempt_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn backoff_delays_grow_between_retries() {
    let mock = MockTransport::new();
    for _ in 0..4 {
        mock.push_status(500);
    }
    let client = client_with(mock.clone());

    client.get("https://example.com/a", &RequestConfig::default()).await;
    let times = mock.attempt_times();
    assert_eq!(times[1] - times[0], Duration::from_millis(100));
    assert_eq!(times[2] - times[1], Duration::from_millis(200));
    assert_eq!(times[3] - times[2], Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn fixed_retry_delay_overrides_backoff() {
    let mock = MockTransport::new();
    mock.push_status(500);
    mock.push_status(500);
    mock.push_status(200);
    let client = client_with(mock.clone());

    let config = RequestConfig {
        retry_delay: Duration::from_secs(2),
        ..Default::default()
    };
    let resp = client.get("https://example.com/a", &config).await;
    assert!(resp.success);
    let times = mock.attempt_times();
    assert_eq!(times[1] - times[0], Duration::from_secs(2));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mock = MockTransport::new();
    mock.push_status(404);
    let client = client_with(mock.clone());

    let resp = client.get("https://example.com/missing", &RequestConfig::default()).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code, 404);
    assert_eq!(resp.error_message, "Client error (status 404)");
    assert_eq!(mock.attempt_count(), 1);
}

#[tokio::test]
async fn network_errors_are_terminal() {
    let mock = MockTransport::new();
    mock.push_error(Error::network("connection refused"));
    let client = client_with(mock.clone());

    let resp = client.get("https://example.com/a", &RequestConfig::default()).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code, 0);
    assert!(resp.error_message.contains("Network error"));
    assert_eq!(mock.attempt_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn overall_budget_bounds_slow_transport() {
    let mock = MockTransport::new();
    mock.push_delayed(200, Duration::from_secs(60));
    let client = client_with(mock.clone());

    let config = RequestConfig {
        timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let start = Instant::now();
    let resp = client.get("https://example.com/slow", &config).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code, 0);
    assert!(resp.error_message.contains("Timeout"));
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn retry_pauses_count_against_budget() {
    let mock = MockTransport::new();
    mock.push_status(500);
    mock.push_status(500);
    let client = client_with(mock.clone());

    // The fixed 10 second pause after the first failure overruns the
    // one second budget, so no second attempt happens.
    let config = RequestConfig {
        timeout: Duration::from_secs(1),
        retry_delay: Duration::from_secs(10),
        ..Default::default()
    };
    let resp = client.get("https://example.com/a", &config).await;
    assert!(!resp.success);
    assert!(resp.error_message.contains("Timeout"));
    assert_eq!(mock.attempt_count(), 1);
}

#[tokio::test]
async fn auth_headers_reach_the_transport() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());

    let config = RequestConfig {
        api_key: Some("key-abc".to_string()),
        oauth_token: Some("tok-xyz".to_string()),
        ..Default::default()
    };
    client.get("https://example.com/a", &config).await;
    let headers = mock.last_headers();
    assert_eq!(headers.get("authorization").unwrap(), "Bearer tok-xyz");
}

#[tokio::test]
async fn reject_mode_returns_429_when_window_full() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());

    let config = RequestConfig {
        rate_limit_per_minute: 2,
        rate_limit_mode: RateLimitMode::Reject,
        ..Default::default()
    };
    assert!(client.get("https://example.com/a", &config).await.success);
    assert!(client.get("https://example.com/a", &config).await.success);

    let third = client.get("https://example.com/a", &config).await;
    assert!(!third.success);
    assert_eq!(third.status_code, 429);
    assert!(third.error_message.contains("Rate limit exceeded"));
    assert_eq!(mock.attempt_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn wait_mode_spaces_attempts_per_host() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());

    let config = RequestConfig {
        rate_limit_per_minute: 60,
        ..Default::default()
    };
    client.get("https://example.com/a", &config).await;
    client.get("https://example.com/b", &config).await;

    let times = mock.attempt_times();
    assert!(times[1] - times[0] >= Duration::from_secs(1));
}

#[tokio::test]
async fn closed_client_fails_fast() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());

    client.close().await;
    assert!(client.is_closed());

    let resp = client.get("https://example.com/a", &RequestConfig::default()).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code, 0);
    assert!(resp.error_message.contains("closed"));
    assert_eq!(mock.attempt_count(), 0);
}

#[tokio::test]
async fn close_is_idempotent_and_shared_across_clones() {
    let client = client_with(MockTransport::new());
    let clone = client.clone();
    client.close().await;
    client.close().await;
    assert!(clone.is_closed());
}

#[tokio::test]
async fn invalid_inputs_never_reach_the_transport() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());
    let config = RequestConfig::default();

    let resp = client.get("ftp://example.com/a", &config).await;
    assert!(resp.error_message.contains("Invalid protocol"));

    let resp = client.get("no-separator", &config).await;
    assert!(resp.error_message.contains("Invalid URL"));

    let resp = client.get("https://example.com:99999/a", &config).await;
    assert!(resp.error_message.contains("Invalid port: 99999"));

    assert_eq!(mock.attempt_count(), 0);
}

#[tokio::test]
async fn config_validation_rejects_bad_settings() {
    let mock = MockTransport::new();
    let client = client_with(mock.clone());

    let config = RequestConfig {
        timeout: Duration::from_secs(600),
        ..Default::default()
    };
    let resp = client.get("https://example.com/a", &config).await;
    assert!(!resp.success);
    assert!(resp.error_message.contains("timeout"));
    assert_eq!(mock.attempt_count(), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected_while_streaming() {
    let mock = MockTransport::new();
    mock.push_body(200, &[0u8; 64]);
    let client = NetClient::builder()
        .client_config(ClientConfig {
            max_response_size: 16,
            ..Default::default()
        })
        .transport(mock)
        .build();

    let resp = client.get("https://example.com/big", &RequestConfig::default()).await;
    assert!(!resp.success);
    assert!(resp.error_message.contains("byte limit"));
}

#[tokio::test]
async fn callback_fires_exactly_once() {
    let mock = MockTransport::new();
    mock.push_body(200, b"done");
    let client = client_with(mock);

    let fired = Arc::new(AtomicUsize::new(0));
    let observed = fired.clone();
    let handle = client.execute_callback(
        Method::GET,
        "https://example.com/a",
        None,
        None,
        &RequestConfig {
            background: true,
            ..Default::default()
        },
        move |resp| {
            assert!(resp.success);
            observed.fetch_add(1, Ordering::SeqCst);
        },
    );

    // Dispatch returns before the spawned task runs.
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    handle.await.unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn spawned_dispatch_delivers_through_channel() {
    let mock = MockTransport::new();
    mock.push_body(201, b"created");
    let client = client_with(mock);

    let rx = client.execute_spawned(
        Method::POST,
        "https://example.com/items",
        Some(b"{}".to_vec()),
        Some("application/json"),
        &RequestConfig::default(),
    );
    let resp = rx.await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.status_code, 201);
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_the_call() {
    let mock = MockTransport::new();
    mock.push_delayed(200, Duration::from_secs(60));
    let client = client_with(mock);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let resp = client
        .execute_cancellable(
            Method::GET,
            "https://example.com/slow",
            None,
            None,
            &RequestConfig::default(),
            cancel,
        )
        .await;
    assert!(!resp.success);
    assert!(resp.error_message.contains("cancelled"));
}

#[tokio::test]
async fn identical_requests_yield_identical_responses() {
    let mock = MockTransport::new();
    mock.push_body(200, b"payload");
    mock.push_body(200, b"payload");
    let client = client_with(mock);

    let config = RequestConfig::default().with_header("X-Api-Version", "2");
    let first = client.get("https://example.com/resource", &config).await;
    let second = client.get("https://example.com/resource", &config).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn clients_can_share_a_rate_limiter() {
    use crate::rate_limiter::HostRateLimiter;

    let limiter = HostRateLimiter::new();
    let a = NetClient::builder()
        .transport(MockTransport::new())
        .rate_limiter(limiter.clone())
        .build();
    let b = NetClient::builder()
        .transport(MockTransport::new())
        .rate_limiter(limiter.clone())
        .build();

    let config = RequestConfig {
        rate_limit_per_minute: 1,
        rate_limit_mode: RateLimitMode::Reject,
        ..Default::default()
    };
    assert!(a.get("https://example.com/x", &config).await.success);
    // Both clients draw on the same per-host window.
    let resp = b.get("https://example.com/y", &config).await;
    assert_eq!(resp.status_code, 429);
    assert_eq!(limiter.tracked_hosts().await, 1);
}

#[tokio::test]
async fn default_reply_for_unscripted_requests() {
    let client = client_with(MockTransport::new());
    let resp = client
        .request(Method::DELETE, "https://example.com/x", None, None, &RequestConfig::default())
        .await;
    assert!(resp.success);
    assert_eq!(resp.status_code, 200);
    assert!(resp.body.is_empty());
}
