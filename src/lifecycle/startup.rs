//! Startup orchestration.
//!
//! Config first, then the engine, then metrics, listener last so traffic only
//! arrives once everything is ready. Any startup error is fatal.

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::BalancerConfig;
use crate::error::BalancerError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Balancer(#[from] BalancerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build every subsystem from `config` and serve until a stop signal.
pub async fn run(config: BalancerConfig) -> Result<(), StartupError> {
    tracing::info!(
        backends = ?config.backends,
        algorithm = %config.algorithm,
        health_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;

    if server.config().observability.metrics_enabled {
        let raw = &server.config().observability.metrics_address;
        match raw.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %raw, "Failed to parse metrics address"),
        }
    }

    let address = server.config().bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address: address.clone(), source })?;

    tracing::info!(
        address = %address,
        stats = %format!("http://{}{}", address, crate::admin::STATS_PATH),
        "Load balancer listening"
    );

    let shutdown = Shutdown::new();
    signals::forward_to(shutdown.clone());

    server.run(listener, shutdown).await?;
    Ok(())
}
