//! Request header assembly.

use crate::config::RequestConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Assembles the header map for one call.
///
/// Order matters: caller-supplied headers first (last write wins for
/// repeated names), then the content type if the caller did not set one,
/// then auth. When both an API key and an OAuth token are configured the
/// OAuth token wins.
pub(crate) fn build_headers(
    config: &RequestConfig,
    content_type: Option<&str>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.additional_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::invalid_request(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::invalid_request(format!("invalid value for header {name}")))?;
        headers.insert(name, value);
    }

    if let Some(content_type) = content_type {
        if !headers.contains_key(CONTENT_TYPE) {
            let value = HeaderValue::from_str(content_type)
                .map_err(|_| Error::invalid_request("invalid content type"))?;
            headers.insert(CONTENT_TYPE, value);
        }
    }

    let token = config.oauth_token.as_deref().or(config.api_key.as_deref());
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::invalid_request("invalid credential value"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
