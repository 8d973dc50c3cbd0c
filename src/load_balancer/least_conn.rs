//! Least Connections load balancing strategy.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Least connections selector.
/// Selects the alive backend with the minimum number of in-flight connections.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &[Arc<Backend>], _cursor: &AtomicUsize) -> Option<Arc<Backend>> {
        // min_by_key keeps the first minimum, so ties go to the lowest index
        backends
            .iter()
            .filter(|b| b.is_alive())
            .min_by_key(|b| b.connections())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(port: u16) -> Arc<Backend> {
        Arc::new(Backend::parse(&format!("http://127.0.0.1:{}", port)).unwrap())
    }

    #[test]
    fn test_least_conn() {
        let lb = LeastConnections;
        let cursor = AtomicUsize::new(0);
        let b1 = backend(8080);
        let b2 = backend(8081);

        b1.inc_connections();
        b1.inc_connections();

        let backends = vec![b1.clone(), b2.clone()];

        // Should pick b2 (0 connections)
        let s1 = lb.next_server(&backends, &cursor).unwrap();
        assert_eq!(s1.address, b2.address);

        b2.inc_connections();
        b2.inc_connections();
        b2.inc_connections(); // now b2 has 3, b1 has 2

        let s2 = lb.next_server(&backends, &cursor).unwrap();
        assert_eq!(s2.address, b1.address);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let lb = LeastConnections;
        let cursor = AtomicUsize::new(0);
        let backends = vec![backend(8080), backend(8081), backend(8082)];
        backends[0].inc_connections();

        for _ in 0..3 {
            let picked = lb.next_server(&backends, &cursor).unwrap();
            assert_eq!(picked.address, backends[1].address);
        }
    }

    #[test]
    fn test_skips_dead_backends() {
        let lb = LeastConnections;
        let cursor = AtomicUsize::new(0);
        let backends = vec![backend(8080), backend(8081)];
        backends[0].set_alive(false);
        backends[1].inc_connections();
        backends[1].inc_connections();

        let picked = lb.next_server(&backends, &cursor).unwrap();
        assert_eq!(picked.address, backends[1].address);

        backends[1].set_alive(false);
        assert!(lb.next_server(&backends, &cursor).is_none());
        assert!(lb.next_server(&backends, &cursor).is_none());
        assert!(lb.next_server(&[], &cursor).is_none());
    }
}
