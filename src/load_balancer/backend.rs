//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track in-flight connections (for Least Connections LB)
//! - Track liveness as last determined by the health monitor

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::uri::{Authority, PathAndQuery, Scheme, Uri};
use url::Url;

use crate::error::BalancerError;
use crate::observability::metrics;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Canonical address (`scheme://host:port`), used as the stats key.
    pub address: String,
    /// Configured URL, probed by the health monitor and used as the forwarding base.
    pub url: Url,
    /// Pre-parsed authority for request rewriting.
    authority: Authority,
    alive: AtomicBool,
    connections: AtomicUsize,
}

impl Backend {
    /// Create a backend from a raw address such as `http://127.0.0.1:8081`.
    ///
    /// Only plain `http` URLs with a host are accepted.
    pub fn parse(raw: &str) -> Result<Self, BalancerError> {
        let invalid = |reason: &str| BalancerError::InvalidAddress {
            address: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid("only http backends are supported"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;

        let host_port = format!("{}:{}", host, port);
        let authority = Authority::try_from(host_port.as_str()).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            address: format!("{}://{}", url.scheme(), host_port),
            url,
            authority,
            alive: AtomicBool::new(true),
            connections: AtomicUsize::new(0),
        })
    }

    /// Return true if the backend may receive traffic.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Get the current number of in-flight connections.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    /// Increment in-flight connection count.
    pub fn inc_connections(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement in-flight connection count, clamping at zero.
    pub fn dec_connections(&self) {
        let _ = self
            .connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Increment the connection count and return a guard that releases it on drop.
    pub fn acquire(self: &Arc<Self>) -> BackendConnectionGuard {
        self.inc_connections();
        metrics::set_active_connections(&self.address, self.connections());
        BackendConnectionGuard {
            backend: self.clone(),
        }
    }

    /// Build the upstream URI for an inbound path and query.
    ///
    /// The backend URL path acts as a prefix, joined with exactly one slash.
    pub fn target_uri(&self, inbound: Option<&PathAndQuery>) -> Result<Uri, axum::http::Error> {
        let (path, query) = match inbound {
            Some(pq) => (pq.path(), pq.query()),
            None => ("/", None),
        };

        let mut joined = join_paths(self.url.path(), path);
        if let Some(q) = query {
            joined.push('?');
            joined.push_str(q);
        }

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(joined)
            .build()
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// A RAII guard that manages the in-flight connection count.
#[derive(Debug)]
pub struct BackendConnectionGuard {
    pub backend: Arc<Backend>,
}

impl Deref for BackendConnectionGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for BackendConnectionGuard {
    fn drop(&mut self) {
        self.backend.dec_connections();
        metrics::set_active_connections(&self.backend.address, self.backend.connections());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_address() {
        let b = Backend::parse("http://localhost:8081/").unwrap();
        assert_eq!(b.address, "http://localhost:8081");

        let b = Backend::parse("http://example.com").unwrap();
        assert_eq!(b.address, "http://example.com:80");
        assert!(b.is_alive());
        assert_eq!(b.connections(), 0);
    }

    #[test]
    fn test_rejects_invalid_addresses() {
        assert!(Backend::parse("not a url").is_err());
        assert!(Backend::parse("https://127.0.0.1:8443").is_err());
        assert!(Backend::parse("unix:/tmp/sock").is_err());
    }

    #[test]
    fn test_connection_counting() {
        let b = Backend::parse("http://127.0.0.1:8081").unwrap();
        b.inc_connections();
        b.inc_connections();
        b.inc_connections();
        b.dec_connections();
        assert_eq!(b.connections(), 2);

        b.dec_connections();
        b.dec_connections();
        b.dec_connections();
        assert_eq!(b.connections(), 0, "extra decrement must clamp at zero");
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let b = Arc::new(Backend::parse("http://127.0.0.1:8081").unwrap());
        {
            let _g1 = b.acquire();
            let _g2 = b.acquire();
            assert_eq!(b.connections(), 2);
        }
        assert_eq!(b.connections(), 0);
    }

    #[test]
    fn test_set_alive_returns_previous() {
        let b = Backend::parse("http://127.0.0.1:8081").unwrap();
        assert!(b.set_alive(false));
        assert!(!b.is_alive());
        assert!(!b.set_alive(true));
        assert!(b.is_alive());
    }

    #[test]
    fn test_target_uri() {
        let b = Backend::parse("http://127.0.0.1:8081").unwrap();
        let pq = PathAndQuery::from_static("/users/7?full=1");
        assert_eq!(
            b.target_uri(Some(&pq)).unwrap().to_string(),
            "http://127.0.0.1:8081/users/7?full=1"
        );

        let prefixed = Backend::parse("http://127.0.0.1:8081/api").unwrap();
        assert_eq!(
            prefixed.target_uri(Some(&pq)).unwrap().to_string(),
            "http://127.0.0.1:8081/api/users/7?full=1"
        );
        assert_eq!(
            prefixed.target_uri(None).unwrap().to_string(),
            "http://127.0.0.1:8081/api/"
        );
    }
}
