//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (snapshot of backends + rotation cursor)
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through alive backends)
//!         - least_conn.rs (pick alive backend with fewest connections)
//!     → backend.rs (acquire connection guard)
//!     → Return backend or None
//! ```
//!
//! # Design Decisions
//! - Strategies are stateless; the pool owns the rotation cursor
//! - Dead backends excluded from selection
//! - Per-backend atomics, no pool-wide lock

use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use serde::Serialize;

pub mod backend;
pub mod least_conn;
pub mod pool;
pub mod round_robin;

use self::backend::Backend;
use self::least_conn::LeastConnections;
use self::round_robin::RoundRobin;

/// A backend selection strategy.
pub trait LoadBalancer: Send + Sync {
    /// Pick a backend, or `None` when no backend is alive.
    fn next_server(&self, backends: &[Arc<Backend>], cursor: &AtomicUsize) -> Option<Arc<Backend>>;
}

/// Load balancing algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "round-robin")]
    RoundRobin,
    #[serde(rename = "least-conn")]
    LeastConn,
}

impl Algorithm {
    /// Parse an algorithm tag. Unknown tags fall back to round-robin.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "round-robin" => Algorithm::RoundRobin,
            "least-conn" => Algorithm::LeastConn,
            other => {
                tracing::warn!(algorithm = %other, "Unknown algorithm, falling back to round-robin");
                Algorithm::RoundRobin
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::RoundRobin => "round-robin",
            Algorithm::LeastConn => "least-conn",
        }
    }

    /// The strategy implementing this algorithm.
    pub fn strategy(&self) -> &'static dyn LoadBalancer {
        match self {
            Algorithm::RoundRobin => &RoundRobin,
            Algorithm::LeastConn => &LeastConnections,
        }
    }
}

impl From<String> for Algorithm {
    fn from(tag: String) -> Self {
        Algorithm::from_tag(&tag)
    }
}

impl<'de> serde::Deserialize<'de> for Algorithm {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Algorithm::from)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
