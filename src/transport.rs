//! HTTP transport seam.
//!
//! [`Transport`] is the trait boundary between the request orchestrator
//! and the actual wire protocol. Production code uses [`HttpTransport`],
//! a `reqwest`-backed implementation that pools one `reqwest::Client`
//! per distinct set of connection-level options; tests substitute a
//! scripted mock.

use crate::config::ClientConfig;
use crate::error::{Error, NetworkError, Result};
use crate::timeout::PhaseTimeouts;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Method;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Mutex;

/// Streamed response body. Chunks arrive as they are read off the wire
/// so the orchestrator can enforce its time and size budgets mid-body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Connection-level options that must be fixed when a connection is
/// established. Options that differ here cannot share a connection
/// pool, so they key the per-client pool in [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionOptions {
    /// Verify the server certificate chain.
    pub verify_ssl: bool,
    /// Require TLS 1.2 or newer.
    pub require_tls12: bool,
    /// Follow 3xx redirects automatically.
    pub follow_redirects: bool,
    /// Maximum redirects to follow when `follow_redirects` is set.
    pub max_redirects: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            require_tls12: true,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

/// One attempt handed to the transport. The orchestrator has already
/// resolved headers, body, and the per-phase deadline split.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL for this attempt.
    pub url: String,
    /// Fully assembled headers (auth already applied).
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Per-phase deadline split for this attempt.
    pub phases: PhaseTimeouts,
    /// Connection-level options for this attempt.
    pub session: SessionOptions,
}

/// What the transport hands back: status, headers, and a body stream.
/// The orchestrator drains the stream under its own budgets.
pub struct TransportReply {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, String>,
    /// Body chunks.
    pub body: BodyStream,
}

/// Abstraction over the HTTP wire protocol.
///
/// A transport performs exactly one attempt per [`send`](Transport::send)
/// call. Retry, rate limiting, and overall deadlines live above this
/// trait in the orchestrator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single HTTP attempt.
    async fn send(&self, request: TransportRequest) -> Result<TransportReply>;
}

/// `reqwest`-backed [`Transport`].
///
/// `reqwest` fixes TLS verification, minimum TLS version, and redirect
/// policy at client construction time, while this crate exposes them
/// per call. The transport therefore keeps a small pool of clients
/// keyed by [`SessionOptions`]; calls with the same options share a
/// client and with it the underlying connection pool.
pub struct HttpTransport {
    config: ClientConfig,
    sessions: Mutex<HashMap<SessionOptions, reqwest::Client>>,
}

impl HttpTransport {
    /// Creates a transport with the given client-level settings.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the pooled client for the given session options, building
    /// it on first use.
    fn session(&self, options: &SessionOptions) -> Result<reqwest::Client> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| Error::invalid_request("transport session pool poisoned"))?;
        if let Some(client) = sessions.get(options) {
            return Ok(client.clone());
        }

        let redirect = if options.follow_redirects {
            Policy::limited(options.max_redirects as usize)
        } else {
            Policy::none()
        };
        let mut builder = reqwest::Client::builder()
            .user_agent(self.config.user_agent.clone())
            .connect_timeout(self.config.connect_timeout)
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .pool_idle_timeout(self.config.pool_idle_timeout)
            .gzip(true)
            .redirect(redirect);
        if !options.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if options.require_tls12 {
            builder = builder.min_tls_version(reqwest::tls::Version::TLS_1_2);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(Box::new(NetworkError::from(e))))?;
        sessions.insert(options.clone(), client.clone());
        Ok(client)
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportReply> {
        let client = self.session(&request.session)?;

        let mut builder = client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(request.phases.io);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(Error::from)?;

        let status = response.status().as_u16();
        let mut headers = HashMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }
        let body: BodyStream =
            Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(Error::from)));

        Ok(TransportReply {
            status,
            headers,
            body,
        })
    }
}
