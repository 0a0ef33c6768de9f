//! Timeout budget for one logical call.
//!
//! One overall budget is subdivided into per-phase upper bounds that are
//! handed to the transport (resolve, connect, I/O). The bounds are caps,
//! not independent allowances: total wall-clock time for the call is
//! enforced separately by wrapping the whole attempt flow in
//! `tokio::time::timeout`, and the body-reading loop re-checks the
//! budget on every chunk.

use std::time::Duration;
use tokio::time::Instant;

/// Cap on the resolution phase regardless of budget size.
const RESOLVE_CAP: Duration = Duration::from_secs(15);
/// Cap on the connect phase regardless of budget size.
const CONNECT_CAP: Duration = Duration::from_secs(30);

/// Per-phase upper bounds passed to the transport collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimeouts {
    /// Upper bound for name resolution.
    pub resolve: Duration,
    /// Upper bound for establishing the connection (including TLS).
    pub connect: Duration,
    /// Upper bound for sending the request and receiving the response,
    /// each.
    pub io: Duration,
}

/// Time budget for one logical call, covering all of its retries.
///
/// # Example
///
/// ```rust
/// use reqflow::timeout::TimeoutBudget;
/// use std::time::Duration;
///
/// let budget = TimeoutBudget::new(Duration::from_secs(20));
/// let phases = budget.phases();
/// assert_eq!(phases.resolve, Duration::from_secs(5));   // 20/4
/// assert_eq!(phases.connect, Duration::from_secs(10));  // 20/2
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBudget {
    total: Duration,
    started: Instant,
}

impl TimeoutBudget {
    /// Starts a new budget clock.
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            started: Instant::now(),
        }
    }

    /// The overall budget.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time left before the budget is exhausted.
    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.started.elapsed())
    }

    /// Whether the budget has been exhausted.
    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.total
    }

    /// Upper bound for the resolution phase: `min(15s, budget / 4)`.
    pub fn resolve_timeout(&self) -> Duration {
        RESOLVE_CAP.min(self.total / 4)
    }

    /// Upper bound for the connect phase: `min(30s, budget / 2)`.
    pub fn connect_timeout(&self) -> Duration {
        CONNECT_CAP.min(self.total / 2)
    }

    /// Upper bound for send/receive: whatever is left of the budget.
    pub fn io_timeout(&self) -> Duration {
        self.remaining()
    }

    /// Snapshot of all per-phase bounds for the next attempt.
    pub fn phases(&self) -> PhaseTimeouts {
        PhaseTimeouts {
            resolve: self.resolve_timeout(),
            connect: self.connect_timeout(),
            io: self.io_timeout(),
        }
    }
}
