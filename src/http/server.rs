//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the stats endpoints and the dispatch fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Start the health monitor alongside the listener
//! - Serve until the shutdown coordinator fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::BalancerConfig;
use crate::error::BalancerError;
use crate::health::HealthMonitor;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::load_balancer::pool::BackendPool;
use crate::stats::StatsCollector;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    pool: Arc<BackendPool>,
    stats: Arc<StatsCollector>,
}

impl HttpServer {
    /// Build the pool and stats collector from configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, BalancerError> {
        let pool = Arc::new(BackendPool::new(&config.backends)?);
        let stats = Arc::new(StatsCollector::new());

        for backend in pool.backends() {
            stats.update_status(&backend.address, backend.is_alive());
        }

        let state = AppState {
            dispatcher: Dispatcher::new(pool.clone(), stats.clone(), config.algorithm),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            pool,
            stats,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        Router::new()
            .merge(admin::router())
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            algorithm = %self.config.algorithm,
            backends = self.pool.len(),
            "HTTP server starting"
        );

        if self.config.health_check.enabled {
            HealthMonitor::new(
                self.pool.clone(),
                self.stats.clone(),
                Duration::from_secs(self.config.health_check.interval_secs),
                Duration::from_secs(self.config.health_check.timeout_secs),
            )
            .spawn(shutdown.subscribe());
        } else {
            tracing::info!("Active health checks disabled");
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let mut stop = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn pool(&self) -> Arc<BackendPool> {
        self.pool.clone()
    }

    pub fn stats(&self) -> Arc<StatsCollector> {
        self.stats.clone()
    }
}

/// Dispatch every non-admin request to a backend.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    state.dispatcher.handle(request).await
}
