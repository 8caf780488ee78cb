//! Health check handlers

use crate::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint. Reports `degraded` when the database does not answer.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.database.ping().await {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
