//! Per-host rate limiting.
//!
//! Tracks admission state per host (two paths on the same host share one
//! budget) and enforces either a minimum inter-request gap or a fixed
//! request count per rolling window, depending on the mode selected per
//! call.
//!
//! # Modes
//!
//! - **Wait** (default): spacing limiter. With `per_minute = N`, requests
//!   to the same host are spaced at least `60000 / N` milliseconds apart;
//!   an early caller sleeps until its reserved slot. Bursts are never
//!   admitted, even when a quota would nominally allow them.
//! - **Reject**: windowed counter. Once `N` admissions have occurred
//!   inside the current rolling 60-second window, further requests are
//!   rejected (the orchestrator surfaces HTTP 429) until the window
//!   rolls over.
//!
//! All hosts share one lock so per-host bookkeeping stays consistent; the
//! lock is never held across a sleep.
//!
//! # Example
//!
//! ```rust
//! use reqflow::rate_limiter::HostRateLimiter;
//!
//! # async fn example() {
//! let limiter = HostRateLimiter::new();
//! // Waits if needed so api.example.com sees at most 30 req/min.
//! limiter.admit("api.example.com", 30).await;
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Length of the admission window.
const WINDOW: Duration = Duration::from_secs(60);

/// How rate-limit overflow is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitMode {
    /// Block until the minimum inter-request gap has elapsed (spacing
    /// limiter). Default.
    #[default]
    Wait,
    /// Reject immediately with a 429-equivalent once the per-minute
    /// count is exhausted inside the current window.
    Reject,
}

/// Per-host admission bookkeeping.
///
/// Created lazily on first request to a host; mutated under the shared
/// lock on every admission check.
#[derive(Debug)]
struct HostEntry {
    /// Most recently reserved admission slot (spacing mode). Stored as
    /// the post-wait instant so successive waits do not drift.
    last_admitted: Instant,
    /// Start of the current counting window (reject mode).
    window_start: Instant,
    /// Admissions inside the current window (reject mode).
    window_count: u32,
}

impl HostEntry {
    fn new(now: Instant) -> Self {
        Self {
            last_admitted: now,
            window_start: now,
            window_count: 0,
        }
    }
}

/// Rate limiter keyed by host.
///
/// Cheap to clone; clones share state. Inject one instance into the
/// client so tests can isolate and reset it.
#[derive(Debug, Clone, Default)]
pub struct HostRateLimiter {
    hosts: Arc<Mutex<HashMap<String, HostEntry>>>,
}

impl HostRateLimiter {
    /// Creates an empty rate limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a request to `host` under the spacing policy, sleeping if
    /// the minimum inter-request gap has not yet elapsed.
    ///
    /// Returns the duration actually waited. `per_minute == 0` disables
    /// limiting and returns zero without touching any state.
    pub async fn admit(&self, host: &str, per_minute: u32) -> Duration {
        if per_minute == 0 {
            return Duration::ZERO;
        }
        let min_interval = WINDOW / per_minute;

        // Reserve the next slot under the lock, then sleep outside it.
        // Racing callers each reserve a distinct slot, so the gap holds
        // in lock-acquisition order.
        let now = Instant::now();
        let slot = {
            let mut hosts = self.hosts.lock().await;
            match hosts.get_mut(host) {
                Some(entry) => {
                    let slot = (entry.last_admitted + min_interval).max(now);
                    entry.last_admitted = slot;
                    slot
                }
                None => {
                    hosts.insert(host.to_string(), HostEntry::new(now));
                    now
                }
            }
        };

        let wait = slot.saturating_duration_since(now);
        if wait > Duration::ZERO {
            debug!(host, wait_ms = %wait.as_millis(), "rate limit: delaying request");
            sleep_until(slot).await;
        }
        wait
    }

    /// Tries to admit a request to `host` under the windowed reject
    /// policy.
    ///
    /// Returns `Ok(())` when admitted, or `Err(wait)` with the time until
    /// the current window rolls over. `per_minute == 0` always admits.
    pub async fn try_admit(&self, host: &str, per_minute: u32) -> Result<(), Duration> {
        if per_minute == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut hosts = self.hosts.lock().await;
        let entry = hosts
            .entry(host.to_string())
            .or_insert_with(|| HostEntry::new(now));

        if now.duration_since(entry.window_start) >= WINDOW {
            entry.window_start = now;
            entry.window_count = 0;
        }

        if entry.window_count < per_minute {
            entry.window_count += 1;
            Ok(())
        } else {
            let remaining = WINDOW.saturating_sub(now.duration_since(entry.window_start));
            debug!(host, retry_after_ms = %remaining.as_millis(), "rate limit: rejecting request");
            Err(remaining)
        }
    }

    /// Number of hosts currently tracked.
    pub async fn tracked_hosts(&self) -> usize {
        self.hosts.lock().await.len()
    }

    /// Clears all per-host state. Intended for shutdown and test
    /// isolation.
    pub async fn reset(&self) {
        self.hosts.lock().await.clear();
    }
}
