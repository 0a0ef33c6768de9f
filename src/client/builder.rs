//! Client construction and lifecycle.

use crate::config::ClientConfig;
use crate::rate_limiter::HostRateLimiter;
use crate::transport::{HttpTransport, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared state behind a [`NetClient`]. Clones of the client share the
/// transport session pool, the rate limiter table, and the closed flag.
pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) limiter: HostRateLimiter,
    pub(crate) config: ClientConfig,
    pub(crate) closed: AtomicBool,
}

/// The request orchestrator.
///
/// Creating a client initializes all shared state; no separate setup
/// call is needed. [`NetClient::close`] releases per-host bookkeeping
/// and makes subsequent calls fail fast.
///
/// # Example
///
/// ```rust,no_run
/// use reqflow::client::NetClient;
/// use reqflow::config::RequestConfig;
///
/// # async fn example() {
/// let client = NetClient::new();
/// let response = client.get("https://api.example.com/status", &RequestConfig::default()).await;
/// if response.success {
///     println!("{}", response.text());
/// }
/// client.close().await;
/// # }
/// ```
#[derive(Clone)]
pub struct NetClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl NetClient {
    /// Creates a client with default settings and a `reqwest`-backed
    /// transport.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for customizing client-level settings or
    /// substituting the transport.
    pub fn builder() -> NetClientBuilder {
        NetClientBuilder::default()
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shuts the client down: drops per-host rate limiter state and
    /// makes every subsequent call fail fast with an invalid-request
    /// error. Close is idempotent and affects all clones.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.limiter.reset().await;
        debug!("client closed");
    }

    /// Client-level settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl Default for NetClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`NetClient`].
#[derive(Default)]
pub struct NetClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    limiter: Option<HostRateLimiter>,
}

impl NetClientBuilder {
    /// Sets client-level configuration (user agent, connection pool,
    /// response size cap).
    #[must_use]
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Substitutes the transport implementation. Intended for tests and
    /// embedding; production clients use the default `reqwest`-backed
    /// transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Shares an existing rate limiter with this client. Several
    /// clients given the same limiter draw on one per-host budget;
    /// tests use this to inspect and reset admission state.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: HostRateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Builds the client.
    pub fn build(self) -> NetClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(self.config.clone())));
        NetClient {
            inner: Arc::new(ClientInner {
                transport,
                limiter: self.limiter.unwrap_or_default(),
                config: self.config,
                closed: AtomicBool::new(false),
            }),
        }
    }
}
