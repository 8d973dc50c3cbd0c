//! HTTP load balancer library.

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod stats;

pub use config::BalancerConfig;
pub use error::BalancerError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::Algorithm;
pub use stats::{StatsCollector, StatsSnapshot};
