//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend
//! - Update backend liveness based on results
//! - Push each result into the stats collector

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::health::state::{ProbeOutcome, Transition};
use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;
use crate::stats::StatsCollector;

const USER_AGENT: &str = "traffic-balancer-health-check";

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    stats: Arc<StatsCollector>,
    interval: Duration,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(
        pool: Arc<BackendPool>,
        stats: Arc<StatsCollector>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            pool,
            stats,
            interval,
            timeout,
            client,
        }
    }

    /// Run the monitor on its own task until `shutdown` fires.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            backends = self.pool.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend concurrently and wait for all of them.
    pub async fn check_all(&self) {
        tracing::debug!("Starting health check");
        let backends = self.pool.backends();
        join_all(backends.iter().map(|backend| self.check_backend(backend))).await;
    }

    async fn check_backend(&self, backend: &Arc<Backend>) {
        let outcome = self.probe(backend).await;
        let alive = outcome.is_alive();
        let was_alive = backend.set_alive(alive);

        match Transition::between(was_alive, alive) {
            Transition::Failed => {
                tracing::warn!(address = %backend.address, outcome = ?outcome, "Backend is down");
            }
            Transition::Recovered => {
                tracing::info!(address = %backend.address, outcome = ?outcome, "Backend is back up");
            }
            Transition::Unchanged => {
                tracing::debug!(address = %backend.address, alive, "Backend status unchanged");
            }
        }

        self.stats.update_status(&backend.address, alive);
        metrics::record_backend_health(&backend.address, alive);
    }

    /// Issue a single GET to the backend URL with the probe timeout.
    pub async fn probe(&self, backend: &Backend) -> ProbeOutcome {
        let request = match Request::builder()
            .method(Method::GET)
            .uri(backend.url.as_str())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(address = %backend.address, error = %e, "Failed to build health check request");
                return ProbeOutcome::Unreachable(e.to_string());
            }
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => ProbeOutcome::from_status(response.status()),
            Ok(Err(e)) => ProbeOutcome::Unreachable(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }
}
