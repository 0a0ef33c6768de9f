//! # reqflow
//!
//! HTTP request orchestration: per-host rate limiting, a strict timeout
//! cascade, retry with exponential backoff on server errors, and
//! normalized responses, on top of a pluggable async transport.
//!
//! # Features
//!
//! - **Normalized outcomes**: every call yields a [`NetworkResponse`];
//!   callers branch on one `success` flag instead of catching errors
//! - **Per-host rate limiting**: request spacing or windowed rejection,
//!   shared across client clones
//! - **Timeout cascade**: one total budget per logical call, split into
//!   resolve/connect/io phases and enforced across retries and body
//!   streaming
//! - **Retry on server errors**: only 5xx responses are retried; network
//!   failures and client errors are terminal
//! - **Async/Await**: built on tokio; background dispatch via callbacks
//!   or channels
//!
//! # Example
//!
//! ```rust,no_run
//! use reqflow::prelude::*;
//!
//! # async fn example() {
//! let client = NetClient::new();
//! let config = RequestConfig {
//!     rate_limit_per_minute: 120,
//!     ..Default::default()
//! };
//!
//! let response = client.get("https://api.example.com/items", &config).await;
//! if response.success {
//!     println!("{}", response.text());
//! } else {
//!     eprintln!("failed: {} (status {})", response.error_message, response.status_code);
//! }
//! client.close().await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Global suppressions for lints that would need excessive local
// annotations across the codebase.
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::return_self_not_must_use)]

// Re-exports of external dependencies
pub use bytes;
pub use reqwest::Method;
pub use serde_json;

// Core modules
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limiter;
pub mod response;
pub mod retry_strategy;
pub mod timeout;
pub mod transport;
pub mod url;

// Re-exports of core types for convenience
pub use client::{NetClient, NetClientBuilder};
pub use config::{ClientConfig, RequestConfig};
pub use error::{ContextExt, Error, NetworkError, Result};
pub use rate_limiter::{HostRateLimiter, RateLimitMode};
pub use response::NetworkResponse;
pub use retry_strategy::RetryPolicy;
pub use timeout::{PhaseTimeouts, TimeoutBudget};
pub use transport::{Transport, TransportReply, TransportRequest};
pub use url::ParsedUrl;
// Re-export CancellationToken for convenient access
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```rust
/// use reqflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{NetClient, NetClientBuilder};
    pub use crate::config::{ClientConfig, RequestConfig};
    pub use crate::error::{ContextExt, Error, Result};
    pub use crate::rate_limiter::RateLimitMode;
    pub use crate::response::NetworkResponse;
    pub use crate::Method;
    pub use tokio_util::sync::CancellationToken;
}

/// Library version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "reqflow");
    }
}
