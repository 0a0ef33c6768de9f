//! # Error Handling for reqflow
//!
//! Strongly-typed errors for the request orchestration path, built with
//! `thiserror`. The taxonomy distinguishes input validation failures
//! (`InvalidUrl`, `InvalidProtocol`, `InvalidPort`), admission rejection
//! (`RateLimit`), transport-level failures (`Network`), deadline
//! exhaustion (`Timeout`), and application-level HTTP outcomes
//! (`Server`, `Client`).
//!
//! ## Design
//!
//! 1. **Type Safety**: every failure mode a caller can branch on has its
//!    own variant; third-party transport errors never leak through the
//!    public API (see [`NetworkError`])
//! 2. **API Stability**: public enums are `#[non_exhaustive]`
//! 3. **Zero Panic**: no `unwrap()`/`expect()` on the request path
//! 4. **Context Rich**: error chain support via [`ContextExt`]
//! 5. **Performance**: `Cow<'static, str>` payloads, boxed large variants
//! 6. **Thread Safety**: all error types are `Send + Sync + 'static`
//!
//! ## Quick Start
//!
//! ```rust
//! use reqflow::error::{Error, Result};
//!
//! fn check_scheme(scheme: &str) -> Result<()> {
//!     if scheme != "http" && scheme != "https" {
//!         return Err(Error::invalid_protocol(scheme.to_string()));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Retry semantics
//!
//! Only server-side HTTP errors (status >= 500) are retryable; network
//! failures, timeouts, and client errors are terminal. See
//! [`Error::is_retryable`].

mod config;
mod context;
mod convert;
mod network;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub use config::{ConfigValidationError, ValidationResult};
pub use context::ContextExt;
pub use network::NetworkError;

/// Result type alias for all reqflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for the `reqflow` crate.
///
/// Validation errors (`InvalidUrl`, `InvalidProtocol`, `InvalidPort`) are
/// produced before any transport attempt. `Network` and `Timeout` abort a
/// logical call without retry. `Server` feeds the retry controller until
/// attempts are exhausted; `Client` is always terminal.
///
/// # Example
///
/// ```rust
/// use reqflow::error::Error;
///
/// let err = Error::server(503);
/// assert_eq!(err.to_string(), "Server error (status 503)");
/// assert!(err.is_retryable());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The URL could not be decomposed into scheme, host, port, and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(Cow<'static, str>),

    /// The URL scheme is not `http` or `https`.
    #[error("Invalid protocol: {0}")]
    InvalidProtocol(Cow<'static, str>),

    /// The port is outside the valid range [1, 65535].
    #[error("Invalid port: {0}")]
    InvalidPort(u32),

    /// Rate limit exceeded (reject-mode admission). Carries a
    /// 429-equivalent status via [`Error::status_code`].
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: Cow<'static, str>,
        /// Optional duration until the current window rolls over
        retry_after: Option<Duration>,
    },

    /// Transport-level failures (DNS, connect, TLS, send).
    /// Boxed to keep the enum small.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// The overall time budget for the logical call was exhausted.
    #[error("Timeout: {0}")]
    Timeout(Cow<'static, str>),

    /// The server answered with a 5xx status after retries were exhausted.
    #[error("Server error (status {status})")]
    Server {
        /// HTTP status code (500..=599)
        status: u16,
    },

    /// The server answered with a 4xx status.
    #[error("Client error (status {status})")]
    Client {
        /// HTTP status code (400..=499)
        status: u16,
    },

    /// Invalid request parameters (oversized body, malformed header,
    /// operation on a closed client).
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    // ==================== Constructor Methods ====================

    /// Creates an invalid-URL error.
    pub fn invalid_url(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Creates an invalid-protocol error.
    pub fn invalid_protocol(scheme: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidProtocol(scheme.into())
    }

    /// Creates an invalid-port error.
    pub fn invalid_port(port: u32) -> Self {
        Self::InvalidPort(port)
    }

    /// Creates a rate limit error with an optional wait hint.
    ///
    /// Accepts both `&'static str` (zero allocation) and `String`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqflow::error::Error;
    /// use std::time::Duration;
    ///
    /// let err = Error::rate_limit("Too many requests", Some(Duration::from_secs(60)));
    /// assert_eq!(err.status_code(), Some(429));
    /// ```
    pub fn rate_limit(
        message: impl Into<Cow<'static, str>>,
        retry_after: Option<Duration>,
    ) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a network error from a message (connection failure).
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a server error for a 5xx status.
    pub fn server(status: u16) -> Self {
        Self::Server { status }
    }

    /// Creates a client error for a 4xx status.
    pub fn client(status: u16) -> Self {
        Self::Client { status }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    // ==================== Context Methods ====================

    /// Attaches context to an existing error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqflow::error::Error;
    ///
    /// let err = Error::network("Connection refused")
    ///     .context("Failed to reach api.example.com");
    /// assert!(err.report().contains("Connection refused"));
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    // ==================== Chain Traversal Methods ====================

    /// Internal helper: iterator over the error chain, penetrating
    /// Context layers.
    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Finds a specific error variant in the chain (penetrates Context layers).
    pub fn find_variant<F>(&self, matcher: F) -> Option<&Error>
    where
        F: Fn(&Error) -> bool,
    {
        self.iter_chain().find(|e| matcher(e))
    }

    /// Generates a detailed error report with the full chain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqflow::error::Error;
    ///
    /// let err = Error::network("Connection refused")
    ///     .context("Failed to fetch status page");
    /// println!("{}", err.report());
    /// // Failed to fetch status page
    /// // Caused by: Network error: Connection failed: Connection refused
    /// ```
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        report.push_str(&self.to_string());

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    // ==================== Helper Methods (Context Penetrating) ====================

    /// Checks if this error is retryable (penetrates Context layers).
    ///
    /// Only server errors (status >= 500) are retryable. Network
    /// failures, timeouts, and everything else are terminal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Server { status } => *status >= 500,
            Error::Context { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns the HTTP status code equivalent for this error, if any
    /// (penetrates Context layers).
    ///
    /// `RateLimit` maps to 429; `Server`/`Client` carry their own status.
    /// Validation, network, and timeout errors have no status (the
    /// orchestrator surfaces them with status 0).
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RateLimit { .. } => Some(429),
            Error::Server { status } | Error::Client { status } => Some(*status),
            Error::Context { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Returns the wait hint if this is a rate limit error (penetrates
    /// Context layers).
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            Error::Context { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    /// Checks if this is a timeout error (penetrates Context layers).
    /// Returns the error message.
    #[must_use]
    pub fn as_timeout(&self) -> Option<&str> {
        match self {
            Error::Timeout(msg) => Some(msg.as_ref()),
            Error::Context { source, .. } => source.as_timeout(),
            _ => None,
        }
    }

    /// Checks if this is a rate limit error (penetrates Context layers).
    /// Returns the message and optional wait hint.
    #[must_use]
    pub fn as_rate_limit(&self) -> Option<(&str, Option<Duration>)> {
        match self {
            Error::RateLimit {
                message,
                retry_after,
            } => Some((message.as_ref(), *retry_after)),
            Error::Context { source, .. } => source.as_rate_limit(),
            _ => None,
        }
    }
}
