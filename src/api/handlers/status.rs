//! Status and health check handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::ApiState;
use crate::error::Result;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Registered users.
    pub users: i64,

    /// Materials awaiting review.
    pub pending_materials: i64,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<ApiState>>) -> Result<Json<HealthResponse>> {
    let users = state.store.count_users().await?;
    let pending_materials = state.store.count_pending_materials().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        users,
        pending_materials,
    }))
}
