pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub const STATS_PATH: &str = "/api/stats";
pub const BACKENDS_PATH: &str = "/api/backends";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(STATS_PATH, get(get_stats))
        .route(BACKENDS_PATH, get(get_backends))
}
