use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::domains::whitelist::actions;
use crate::domains::whitelist::StoreStats;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: StoreStats,
}

/// Health check endpoint
///
/// The store lives in memory, so the process answering is the health signal;
/// the counts make it easy to spot an unexpectedly empty database.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        store: actions::stats(&state.deps).await,
    })
}
