//! Per-request dispatch to a selected backend.
//!
//! # Responsibilities
//! - Select a backend with the configured algorithm
//! - Hold a connection guard for the lifetime of the exchange
//! - Forward method, headers and streamed body; relay the response
//! - Record the request against the backend in the stats collector
//!
//! # Design Decisions
//! - No retry on a different backend; upstream failures surface as 502
//! - The guard rides inside the relayed body, so the connection count is
//!   released when the body finishes or the client goes away

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::StreamExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::request::{client_addr, forward_headers, request_id};
use crate::http::response::{bad_gateway, service_unavailable, strip_hop_by_hop};
use crate::load_balancer::backend::BackendConnectionGuard;
use crate::load_balancer::pool::BackendPool;
use crate::load_balancer::Algorithm;
use crate::observability::metrics;
use crate::stats::StatsCollector;

/// Request entry point of the load balancer.
#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<BackendPool>,
    stats: Arc<StatsCollector>,
    algorithm: Algorithm,
    client: Client<HttpConnector, Body>,
}

impl Dispatcher {
    pub fn new(pool: Arc<BackendPool>, stats: Arc<StatsCollector>, algorithm: Algorithm) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            pool,
            stats,
            algorithm,
            client,
        }
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Forward one inbound request and produce the response for the caller.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let request_id = request_id(&request);

        let Some(backend) = self.pool.select(self.algorithm) else {
            tracing::warn!(
                request_id = %request_id,
                algorithm = %self.algorithm,
                "No available backends"
            );
            metrics::record_unavailable();
            return service_unavailable();
        };

        let guard = backend.acquire();
        self.stats.record_request(&guard.address);

        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
            backend = %guard.address,
            connections = guard.connections(),
            "Forwarding request"
        );

        let client = client_addr(&request);
        let (mut parts, body) = request.into_parts();

        let uri = match guard.target_uri(parts.uri.path_and_query()) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(request_id = %request_id, backend = %guard.address, error = %e, "Failed to build upstream URI");
                metrics::record_request(&guard.address, 502, start);
                return bad_gateway();
            }
        };
        forward_headers(&mut parts.headers, client);

        let mut upstream = Request::new(body);
        *upstream.method_mut() = parts.method;
        *upstream.uri_mut() = uri;
        *upstream.headers_mut() = parts.headers;

        match self.client.request(upstream).await {
            Ok(response) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                metrics::record_request(&guard.address, parts.status.as_u16(), start);
                Response::from_parts(parts, release_on_end(Body::new(body), guard))
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    backend = %guard.address,
                    error = %e,
                    "Upstream error"
                );
                metrics::record_request(&guard.address, 502, start);
                bad_gateway()
            }
        }
    }
}

/// Keep `guard` alive until the relayed body is finished or dropped.
fn release_on_end(body: Body, guard: BackendConnectionGuard) -> Body {
    let stream = body.into_data_stream().map(move |chunk| {
        let _held = &guard;
        chunk
    });
    Body::from_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_all_dead_returns_503() {
        let pool = Arc::new(BackendPool::new(&["http://127.0.0.1:1", "http://127.0.0.1:2"]).unwrap());
        for b in pool.backends() {
            b.set_alive(false);
        }
        let stats = Arc::new(StatsCollector::new());
        let dispatcher = Dispatcher::new(pool.clone(), stats.clone(), Algorithm::RoundRobin);

        let response = dispatcher.handle(Request::new(Body::empty())).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(pool.backends().iter().all(|b| b.connections() == 0));
        assert_eq!(stats.snapshot().total_requests, 0);
    }

    #[tokio::test]
    async fn test_unreachable_backend_returns_502_and_releases() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let pool = Arc::new(BackendPool::new(&[address]).unwrap());
        let stats = Arc::new(StatsCollector::new());
        let dispatcher = Dispatcher::new(pool.clone(), stats.clone(), Algorithm::LeastConn);

        let response = dispatcher
            .handle(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let backend = &pool.backends()[0];
        assert_eq!(backend.connections(), 0);
        assert_eq!(stats.snapshot().backend_requests[&backend.address], 1);
    }
}
