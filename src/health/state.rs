//! Probe outcomes and the backend liveness state machine.
//!
//! # State Transitions
//! ```text
//! Alive → Dead:  probe fails (connection error, timeout, 5xx)
//! Dead → Alive:  probe succeeds (any status below 500)
//! ```
//!
//! # Design Decisions
//! - A single probe decides the state; no hysteresis
//! - Anything below 500 counts as reachable: liveness, not correctness

use axum::http::StatusCode;

/// Result of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Backend answered with a status below 500.
    Reachable(StatusCode),
    /// Backend answered with a 5xx status.
    ServerError(StatusCode),
    /// Connection could not be established or the exchange failed.
    Unreachable(String),
    /// No response within the probe timeout.
    TimedOut,
}

impl ProbeOutcome {
    /// Classify a received status code.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() || status.as_u16() >= 600 {
            ProbeOutcome::ServerError(status)
        } else {
            ProbeOutcome::Reachable(status)
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable(_))
    }
}

/// A liveness change observed after applying a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Recovered,
    Failed,
}

impl Transition {
    pub fn between(was_alive: bool, is_alive: bool) -> Self {
        match (was_alive, is_alive) {
            (false, true) => Transition::Recovered,
            (true, false) => Transition::Failed,
            _ => Transition::Unchanged,
        }
    }
}
