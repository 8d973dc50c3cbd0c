//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, upstream headers)
//!     → dispatcher.rs (select backend, forward, relay)
//!     → response.rs (strip hop-by-hop headers, local error responses)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
