//! From implementations for converting between error types.

use crate::error::{Error, NetworkError};
use std::error::Error as StdError;

/// Maximum length for error messages to prevent memory bloat from large
/// transport error chains.
pub(crate) const MAX_ERROR_MESSAGE_LEN: usize = 1024;

/// Truncates a string to a maximum length, adding "... (truncated)" if needed.
pub(crate) fn truncate_message(mut msg: String) -> String {
    if msg.len() > MAX_ERROR_MESSAGE_LEN {
        msg.truncate(MAX_ERROR_MESSAGE_LEN);
        msg.push_str("... (truncated)");
    }
    msg
}

/// Joins the full source chain of an error into one message, so that
/// classification can see causes buried below reqwest's top-level text.
fn chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut msg = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        current = cause.source();
    }
    msg
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::Network(Box::new(e))
    }
}

impl From<Box<NetworkError>> for Error {
    fn from(e: Box<NetworkError>) -> Self {
        Error::Network(e)
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return NetworkError::Timeout;
        }
        if e.is_connect() {
            // reqwest folds DNS, TCP, and TLS failures into "connect";
            // the source chain tells them apart.
            let msg = truncate_message(chain_message(&e));
            let lower = msg.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return NetworkError::DnsResolution(msg);
            }
            if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
                return NetworkError::Ssl(msg);
            }
            return NetworkError::ConnectionFailed(msg);
        }
        if e.is_request() || e.is_body() {
            return NetworkError::SendFailed(truncate_message(chain_message(&e)));
        }
        NetworkError::Transport(Box::new(e))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(Box::new(NetworkError::from(e)))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidRequest(truncate_message(format!("JSON error: {e}")).into())
    }
}
