//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend concurrently
//!     → Classify via state.rs
//!     → Update backend liveness + stats
//! ```
//!
//! # Design Decisions
//! - Health state is per-backend, stored in the backend itself
//! - Every backend is probed once per tick before the next tick starts
//! - Probe failures are expected steady-state events, retried next tick

pub mod active;
pub mod state;

pub use active::HealthMonitor;
