//! Network-related error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Encapsulated transport errors hiding implementation details.
///
/// This type wraps all transport-level failures without exposing
/// third-party library types (like `reqwest::Error`) in the public API,
/// keeping the API stable if the underlying HTTP library changes.
///
/// None of these variants is retried by the orchestrator: a DNS, connect,
/// TLS, or send failure aborts the logical call immediately, and a
/// transport-level timeout is surfaced as terminal.
///
/// # Example
///
/// ```rust
/// use reqflow::error::NetworkError;
///
/// fn describe(err: &NetworkError) -> &'static str {
///     match err {
///         NetworkError::DnsResolution(_) => "check the hostname",
///         NetworkError::Ssl(_) => "check the certificate",
///         NetworkError::Timeout => "the server is slow",
///         _ => "check connectivity",
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// DNS resolution failed.
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// TCP connection failed (refused, reset, unreachable).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// SSL/TLS handshake or certificate validation error.
    #[error("SSL/TLS error: {0}")]
    Ssl(String),

    /// The request could not be transmitted after the connection was
    /// established.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// A transport phase exceeded its allotted sub-timeout.
    #[error("Request timeout")]
    Timeout,

    /// Opaque transport error for underlying issues.
    /// Uses `Box<dyn StdError>` to hide implementation details while
    /// preserving the source for downcast.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
