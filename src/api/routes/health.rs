use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::application::IndexStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub index: IndexStatus,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Always 200: an empty index is a valid state, queries just need inline documents.
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let index = state.index.status().await;
    let status = match index {
        IndexStatus::Ready(_) => "ready",
        IndexStatus::Building { .. } => "building",
        IndexStatus::Empty => "empty",
    };

    Json(ReadinessResponse {
        status: status.into(),
        index,
    })
}
