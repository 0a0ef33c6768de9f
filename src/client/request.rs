//! The orchestration path for one logical call.
//!
//! A call flows through validation, per-host admission, the timeout
//! cascade, and the retry loop, and always comes back as a
//! [`NetworkResponse`]. Errors never escape as `Err`; they are
//! normalized so callers have a single branch point (`success`).

use super::build_headers;
use crate::client::NetClient;
use crate::config::RequestConfig;
use crate::error::{Error, Result};
use crate::rate_limiter::RateLimitMode;
use crate::response::NetworkResponse;
use crate::retry_strategy::RetryPolicy;
use crate::timeout::TimeoutBudget;
use crate::transport::{BodyStream, SessionOptions, TransportRequest};
use crate::url::ParsedUrl;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

impl NetClient {
    /// Performs a GET request.
    pub async fn get(&self, url: &str, config: &RequestConfig) -> NetworkResponse {
        self.execute(Method::GET, url, None, None, config).await
    }

    /// Performs a POST request with a body.
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Vec<u8>>,
        content_type: &str,
        config: &RequestConfig,
    ) -> NetworkResponse {
        self.execute(Method::POST, url, Some(body.into()), Some(content_type), config)
            .await
    }

    /// Performs a PUT request with a body.
    pub async fn put(
        &self,
        url: &str,
        body: impl Into<Vec<u8>>,
        content_type: &str,
        config: &RequestConfig,
    ) -> NetworkResponse {
        self.execute(Method::PUT, url, Some(body.into()), Some(content_type), config)
            .await
    }

    /// Performs a PATCH request with a body.
    pub async fn patch(
        &self,
        url: &str,
        body: impl Into<Vec<u8>>,
        content_type: &str,
        config: &RequestConfig,
    ) -> NetworkResponse {
        self.execute(Method::PATCH, url, Some(body.into()), Some(content_type), config)
            .await
    }

    /// Performs a DELETE request.
    pub async fn delete(&self, url: &str, config: &RequestConfig) -> NetworkResponse {
        self.execute(Method::DELETE, url, None, None, config).await
    }

    /// Performs a request with an arbitrary method.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
    ) -> NetworkResponse {
        self.execute(method, url, body, content_type, config).await
    }

    /// Performs one logical call and normalizes the outcome.
    ///
    /// This is the single entry point all convenience methods funnel
    /// into. It never fails: every error becomes a response with
    /// `success = false`, a descriptive `error_message`, and status 0
    /// when no HTTP exchange completed.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
    ) -> NetworkResponse {
        match self.try_execute(method, url, body, content_type, config).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url, error = %err, "request failed");
                NetworkResponse::from_error(&err)
            }
        }
    }

    /// Like [`execute`](Self::execute), but abandons the call when the
    /// token is cancelled. A cancelled call yields a failed response;
    /// any in-flight attempt is dropped.
    pub async fn execute_cancellable(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
        cancel: CancellationToken,
    ) -> NetworkResponse {
        tokio::select! {
            response = self.execute(method, url, body, content_type, config) => response,
            _ = cancel.cancelled() => {
                debug!(url, "request cancelled");
                NetworkResponse::from_error(&Error::invalid_request("request cancelled"))
            }
        }
    }

    async fn try_execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        config: &RequestConfig,
    ) -> Result<NetworkResponse> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::invalid_request("client is closed"));
        }

        let validation = config
            .validate()
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        for warning in &validation.warnings {
            warn!(url, "{warning}");
        }

        let parsed = ParsedUrl::parse(url)?;
        if parsed.scheme != "http" && parsed.scheme != "https" {
            return Err(Error::invalid_protocol(parsed.scheme));
        }
        if !(1..=65535).contains(&parsed.port) {
            return Err(Error::invalid_port(parsed.port));
        }

        let headers = build_headers(config, content_type)?;
        debug!(
            %method,
            url,
            timeout = ?config.timeout,
            max_retries = config.max_retries,
            "dispatching request"
        );

        // The budget covers admission waits, every attempt, backoff
        // pauses, and body streaming.
        tokio::time::timeout(
            config.timeout,
            self.run(method, url, &parsed, headers, body.map(Bytes::from), config),
        )
        .await
        .map_err(|_| {
            Error::timeout(format!(
                "request to {} exceeded {:?} budget",
                parsed.host, config.timeout
            ))
        })?
    }

    async fn run(
        &self,
        method: Method,
        url: &str,
        parsed: &ParsedUrl,
        headers: HeaderMap,
        body: Option<Bytes>,
        config: &RequestConfig,
    ) -> Result<NetworkResponse> {
        let budget = TimeoutBudget::new(config.timeout);

        match config.rate_limit_mode {
            RateLimitMode::Wait => {
                let waited = self
                    .inner
                    .limiter
                    .admit(&parsed.host, config.rate_limit_per_minute)
                    .await;
                if !waited.is_zero() {
                    trace!(host = %parsed.host, ?waited, "rate limit wait");
                }
            }
            RateLimitMode::Reject => {
                self.inner
                    .limiter
                    .try_admit(&parsed.host, config.rate_limit_per_minute)
                    .await
                    .map_err(|until| {
                        Error::rate_limit(
                            format!(
                                "host {} exceeded {} requests per minute",
                                parsed.host, config.rate_limit_per_minute
                            ),
                            Some(until),
                        )
                    })?;
            }
        }

        let policy = RetryPolicy::new(
            config.max_retries,
            (!config.retry_delay.is_zero()).then_some(config.retry_delay),
        );
        let session = SessionOptions {
            verify_ssl: config.verify_ssl,
            require_tls12: config.require_tls12,
            follow_redirects: config.follow_redirects,
            max_redirects: config.max_redirects,
        };

        let mut retries_done = 0u32;
        loop {
            if budget.expired() {
                return Err(Error::timeout(format!(
                    "time budget exhausted before attempt {}",
                    retries_done + 1
                )));
            }

            let request = TransportRequest {
                method: method.clone(),
                url: url.to_string(),
                headers: headers.clone(),
                body: body.clone(),
                phases: budget.phases(),
                session: session.clone(),
            };

            // Transport failures are terminal; only a completed exchange
            // with a 5xx status feeds the retry controller.
            let reply = self.inner.transport.send(request).await?;

            if policy.should_retry(reply.status, retries_done) {
                let delay = policy.delay(retries_done);
                retries_done += 1;
                debug!(
                    url,
                    status = reply.status,
                    retry = retries_done,
                    ?delay,
                    "server error, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = self.drain_body(reply.body, &budget).await?;
            trace!(url, status = reply.status, bytes = body.len(), "request complete");
            return Ok(NetworkResponse::classify(reply.status, reply.headers, body));
        }
    }

    /// Reads the body stream to completion, rechecking the time budget
    /// between chunks and enforcing the response size cap.
    async fn drain_body(&self, mut stream: BodyStream, budget: &TimeoutBudget) -> Result<Vec<u8>> {
        let cap = self.inner.config.max_response_size;
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if budget.expired() {
                return Err(Error::timeout(
                    "time budget exhausted while reading response body",
                ));
            }
            if buf.len() + chunk.len() > cap {
                return Err(Error::invalid_request(format!(
                    "response body exceeds {cap} byte limit"
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}
