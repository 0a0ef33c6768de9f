//! Minimal URL decomposition.
//!
//! Splits a URL string into scheme, host, port, and path. Intentionally
//! minimal: no percent-decoding, no character-set validation, no
//! relative-reference resolution. Callers needing full RFC 3986
//! compliance must pre-normalize the URL. Scheme validity and port range
//! are checked by the orchestrator, not here.

use crate::error::{Error, Result};

/// A URL decomposed into its transport-relevant parts.
///
/// # Example
///
/// ```rust
/// use reqflow::url::ParsedUrl;
///
/// let url = ParsedUrl::parse("https://api.example.com/v1/status").unwrap();
/// assert_eq!(url.scheme, "https");
/// assert_eq!(url.host, "api.example.com");
/// assert_eq!(url.port, 443);
/// assert_eq!(url.path, "/v1/status");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// URL scheme, as written (not validated here).
    pub scheme: String,
    /// Host name with any `:port` suffix stripped.
    pub host: String,
    /// Explicit port if present, otherwise 443 for `https` and 80 for
    /// everything else. Range validation is the orchestrator's job.
    pub port: u32,
    /// Path including the leading `/`; defaults to `/` when absent.
    pub path: String,
}

impl ParsedUrl {
    /// Decomposes a URL string.
    ///
    /// Fails with [`Error::InvalidUrl`] when the `scheme://` separator is
    /// missing, the host is empty, or an explicit port is not numeric.
    pub fn parse(url: &str) -> Result<Self> {
        let scheme_end = url
            .find("://")
            .ok_or_else(|| Error::invalid_url(format!("missing scheme separator in '{url}'")))?;

        let scheme = url[..scheme_end].to_string();
        let rest = &url[scheme_end + 3..];

        let (mut host, path) = match rest.find('/') {
            Some(slash) => (rest[..slash].to_string(), rest[slash..].to_string()),
            None => (rest.to_string(), "/".to_string()),
        };

        let mut port = if scheme == "https" { 443 } else { 80 };

        // Port candidate is everything after the last ':'.
        if let Some(sep) = host.rfind(':') {
            let port_str = &host[sep + 1..];
            port = port_str.parse::<u32>().map_err(|_| {
                Error::invalid_url(format!("non-numeric port '{port_str}' in '{url}'"))
            })?;
            host.truncate(sep);
        }

        if host.is_empty() {
            return Err(Error::invalid_url(format!("empty host in '{url}'")));
        }

        Ok(Self {
            scheme,
            host,
            port,
            path,
        })
    }
}
