use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::stats::StatsSnapshot;

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub address: String,
    pub alive: bool,
    pub connections: usize,
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.dispatcher.stats().snapshot())
}

pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .dispatcher
        .pool()
        .backends()
        .iter()
        .map(|b| BackendStatus {
            address: b.address.clone(),
            alive: b.is_alive(),
            connections: b.connections(),
        })
        .collect();

    Json(statuses)
}
