//! Backend pool management.
//!
//! # Responsibilities
//! - Build the fixed, ordered backend list from configured addresses
//! - Own the shared rotation cursor
//! - Apply load balancing algorithms to select backends

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::error::BalancerError;
use crate::load_balancer::{backend::Backend, Algorithm};

/// An ordered, fixed-size collection of backends.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    cursor: AtomicUsize,
}

impl BackendPool {
    /// Create a pool from configured addresses, preserving their order.
    ///
    /// Invalid addresses are dropped with a warning; construction fails only
    /// when none remain.
    pub fn new<S: AsRef<str>>(addresses: &[S]) -> Result<Self, BalancerError> {
        let mut backends = Vec::with_capacity(addresses.len());

        for raw in addresses {
            match Backend::parse(raw.as_ref()) {
                Ok(backend) => {
                    tracing::info!(address = %backend.address, "Configured backend");
                    backends.push(Arc::new(backend));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping invalid backend address");
                }
            }
        }

        if backends.is_empty() {
            return Err(BalancerError::NoBackends);
        }

        Ok(Self {
            backends,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Select a backend with the given algorithm.
    pub fn select(&self, algorithm: Algorithm) -> Option<Arc<Backend>> {
        algorithm.strategy().next_server(&self.backends, &self.cursor)
    }

    /// Snapshot of all backends in pool order (for health checking and stats).
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        self.backends.clone()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
