//! Per-call and client-level configuration.

use crate::error::{ConfigValidationError, ValidationResult};
use crate::rate_limiter::RateLimitMode;
use std::time::Duration;

/// Configuration for one logical call.
///
/// All fields have defaults; absent/zero values mean "feature disabled"
/// except `timeout`, which always has a positive value.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Overall time budget for the call, including all retries
    /// (default: 30 seconds).
    pub timeout: Duration,
    /// Whether to validate the server certificate (default: true).
    pub verify_ssl: bool,
    /// Whether to require TLS 1.2 or higher (default: true).
    pub require_tls12: bool,
    /// Whether to follow redirects (default: true).
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow (default: 5).
    pub max_redirects: u32,
    /// Maximum retry attempts on server errors (default: 3).
    pub max_retries: u32,
    /// Fixed delay between retries; zero selects exponential backoff
    /// (default: zero).
    pub retry_delay: Duration,
    /// API key injected as `Authorization: Bearer <key>` unless an OAuth
    /// token is also set.
    pub api_key: Option<String>,
    /// OAuth token injected as `Authorization: Bearer <token>`; takes
    /// precedence over `api_key`.
    pub oauth_token: Option<String>,
    /// Per-host rate limit in requests per minute; zero disables
    /// limiting (default: 0).
    pub rate_limit_per_minute: u32,
    /// How rate-limit overflow is handled (default: wait).
    pub rate_limit_mode: RateLimitMode,
    /// Whether the call was dispatched through the async path. Cleared
    /// by the dispatcher before the inner call so it never recurses.
    pub background: bool,
    /// Extra headers applied before auth injection, in order
    /// (last-write-wins for repeated names).
    pub additional_headers: Vec<(String, String)>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_ssl: true,
            require_tls12: true,
            follow_redirects: true,
            max_redirects: 5,
            max_retries: 3,
            retry_delay: Duration::ZERO,
            api_key: None,
            oauth_token: None,
            rate_limit_per_minute: 0,
            rate_limit_mode: RateLimitMode::Wait,
            background: false,
            additional_headers: Vec::new(),
        }
    }
}

impl RequestConfig {
    /// Adds a header, preserving insertion order.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.push((name.into(), value.into()));
        self
    }

    /// Validates the configuration parameters.
    ///
    /// # Validation Rules
    ///
    /// - `timeout` must be positive and at most 5 minutes
    /// - `timeout` < 1 second generates a warning
    /// - `max_retries` must be <= 10
    /// - `max_redirects` must be <= 20
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqflow::config::RequestConfig;
    /// use std::time::Duration;
    ///
    /// assert!(RequestConfig::default().validate().is_ok());
    ///
    /// let bad = RequestConfig {
    ///     timeout: Duration::from_secs(600),
    ///     ..Default::default()
    /// };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        let mut warnings = Vec::new();

        if self.timeout.is_zero() {
            return Err(ConfigValidationError::invalid(
                "timeout",
                "timeout must be positive",
            ));
        }
        if self.timeout > Duration::from_secs(300) {
            return Err(ConfigValidationError::too_high(
                "timeout",
                format!("{:?}", self.timeout),
                "5 minutes",
            ));
        }
        if self.timeout < Duration::from_secs(1) {
            warnings.push(format!(
                "timeout {:?} is very short, may cause frequent timeouts",
                self.timeout
            ));
        }

        if self.max_retries > 10 {
            return Err(ConfigValidationError::too_high(
                "max_retries",
                self.max_retries,
                10,
            ));
        }

        if self.max_redirects > 20 {
            return Err(ConfigValidationError::too_high(
                "max_redirects",
                self.max_redirects,
                20,
            ));
        }

        Ok(ValidationResult::with_warnings(warnings))
    }
}

/// Client-level configuration: session concerns shared by all calls.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Default User-Agent header value.
    pub user_agent: String,
    /// TCP connection timeout baked into pooled clients (default: 10
    /// seconds). The per-call budget still caps the attempt as a whole.
    pub connect_timeout: Duration,
    /// Maximum response body size in bytes (default: 10MB).
    ///
    /// Responses exceeding this limit are rejected while streaming. This
    /// protects against abnormal responses that could exhaust memory.
    pub max_response_size: usize,
    /// Maximum number of idle connections per host in the connection
    /// pool (default: 10).
    pub pool_max_idle_per_host: usize,
    /// Timeout for idle pooled connections (default: 90 seconds).
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("reqflow/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            max_response_size: 10 * 1024 * 1024,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Validates the client configuration.
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        if self.max_response_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_response_size",
                "max_response_size cannot be zero",
            ));
        }
        Ok(ValidationResult::new())
    }
}
