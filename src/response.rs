//! Normalized response type.

use crate::error::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// The outcome of one logical call, produced exactly once per call.
///
/// The orchestrator never fails with an exception-like error: every
/// failure mode is normalized into a response with `success = false` and
/// a human-readable `error_message`. Callers can always branch on
/// `success` before touching `status_code`, which stays 0 when no
/// attempt ever reached the transport.
///
/// # Example
///
/// ```rust
/// use reqflow::response::NetworkResponse;
///
/// fn handle(response: &NetworkResponse) {
///     if response.success {
///         println!("{}", response.text());
///     } else {
///         eprintln!("{} ({})", response.error_message, response.status_code);
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkResponse {
    /// HTTP status code; 0 if no response was obtained.
    pub status_code: u16,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, String>,
    /// Whether the status code is in 200..300.
    pub success: bool,
    /// Human-readable failure description; empty on success.
    pub error_message: String,
}

impl NetworkResponse {
    /// Builds a response from a completed transport attempt, deriving
    /// the success flag and error message from the final status code.
    pub(crate) fn classify(
        status_code: u16,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        let success = (200..300).contains(&status_code);
        let error_message = match status_code {
            400..=499 => Error::client(status_code).to_string(),
            500..=599 => Error::server(status_code).to_string(),
            _ => String::new(),
        };
        Self {
            status_code,
            body,
            headers,
            success,
            error_message,
        }
    }

    /// Normalizes a terminal error into a response. The status code is 0
    /// unless the error carries an HTTP-equivalent status (429 for rate
    /// limiting, the original status for server/client errors).
    pub(crate) fn from_error(err: &Error) -> Self {
        Self {
            status_code: err.status_code().unwrap_or(0),
            body: Vec::new(),
            headers: HashMap::new(),
            success: false,
            error_message: err.to_string(),
        }
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The body parsed as JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}
