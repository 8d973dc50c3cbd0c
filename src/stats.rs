//! Request and liveness statistics.
//!
//! # Responsibilities
//! - Count requests in total and per backend
//! - Remember the last-known liveness of each backend
//! - Hand out owned snapshots for the stats endpoint
//!
//! # Design Decisions
//! - One `RwLock` guards all counters so the total always equals the sum
//!   of per-backend counts
//! - Snapshots are deep copies; callers never hold the lock

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    backend_requests: BTreeMap<String, u64>,
    backend_status: BTreeMap<String, bool>,
}

/// Concurrency-safe statistics aggregator.
#[derive(Debug)]
pub struct StatsCollector {
    inner: RwLock<Counters>,
    started: Instant,
}

/// Point-in-time copy of the collected statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub backend_requests: BTreeMap<String, u64>,
    pub backend_status: BTreeMap<String, bool>,
    pub uptime: String,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Counters::default()),
            started: Instant::now(),
        }
    }

    /// Count one request forwarded to `address`.
    pub fn record_request(&self, address: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.total_requests += 1;
        *inner.backend_requests.entry(address.to_string()).or_insert(0) += 1;
    }

    /// Store the last-known liveness of `address`.
    pub fn update_status(&self, address: &str, alive: bool) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.backend_status.insert(address.to_string(), alive);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        StatsSnapshot {
            total_requests: inner.total_requests,
            backend_requests: inner.backend_requests.clone(),
            backend_status: inner.backend_status.clone(),
            uptime: format_uptime(self.started.elapsed()),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a duration as `1h2m3s`, dropping leading zero units.
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
