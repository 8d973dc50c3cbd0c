//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector.
/// Each candidate looked at claims one slot of the shared cursor.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>], cursor: &AtomicUsize) -> Option<Arc<Backend>> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        // Bounded scan: at most one pass over the pool.
        for _ in 0..len {
            let index = cursor.fetch_add(1, Ordering::Relaxed) % len;
            let backend = &backends[index];
            if backend.is_alive() {
                return Some(backend.clone());
            }
        }
        None
    }
}
