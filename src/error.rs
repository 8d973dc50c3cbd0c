//! Error types shared across subsystems.

use thiserror::Error;

/// Errors raised while building the load-balancing engine.
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("invalid backend address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("no valid backends configured")]
    NoBackends,
}
