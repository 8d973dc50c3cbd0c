//! HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                LOAD BALANCER                  │
//!     Client Request    │  ┌─────────┐    ┌────────────┐   ┌─────────┐ │
//!     ──────────────────┼─▶│  http   │───▶│ dispatcher │──▶│  pool + │ │
//!                       │  │ server  │    │            │   │selector │ │
//!                       │  └─────────┘    └─────┬──────┘   └────┬────┘ │
//!                       │                       │               │      │
//!     Client Response   │                       ▼               ▼      │
//!     ◀─────────────────┼────────────────── forward ──────▶ backend ───┼──▶ Upstream
//!                       │                       │                      │
//!                       │                       ▼                      │
//!                       │  ┌────────┐    ┌─────────────┐               │
//!                       │  │ health │───▶│    stats    │◀── /api/stats │
//!                       │  │monitor │    │  collector  │               │
//!                       │  └────────┘    └─────────────┘               │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use traffic_balancer::config::{self, Overrides};
use traffic_balancer::lifecycle::startup;
use traffic_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "traffic-balancer")]
#[command(about = "HTTP load balancer with health checks", long_about = None)]
#[command(after_help = "Example: traffic-balancer --backends=http://127.0.0.1:8081,http://127.0.0.1:8082 --port=8080 --algorithm=round-robin --health=30")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated backend URLs
    #[arg(long, env = "LB_BACKENDS", value_delimiter = ',')]
    backends: Option<Vec<String>>,

    /// Port to listen on
    #[arg(short, long, env = "LB_PORT")]
    port: Option<u16>,

    /// Load balancing algorithm (round-robin, least-conn)
    #[arg(short, long, env = "LB_ALGORITHM")]
    algorithm: Option<String>,

    /// Health check interval in seconds
    #[arg(long = "health", env = "LB_HEALTH_INTERVAL")]
    health_interval: Option<u64>,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Overrides {
            backends: cli.backends,
            port: cli.port,
            algorithm: cli.algorithm,
            health_interval_secs: cli.health_interval,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    let path = cli.config.take();

    let config = match config::resolve(path.as_deref(), cli.into()) {
        Ok(config) => config,
        Err(e) => {
            logging::init("traffic_balancer=info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init(&config.observability.log_filter);
    tracing::info!("traffic-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
