//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, health monitor:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the HTTP layer and upstream requests
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
