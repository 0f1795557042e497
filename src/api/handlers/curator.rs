//! Curator dashboard handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::auth::Curator;
use crate::api::ApiState;
use crate::error::Result;
use crate::models::MaterialStatus;

use super::MaterialResponse;

/// Curator dashboard statistics.
#[derive(Serialize)]
pub struct StatsResponse {
    pub pending: i64,
    pub approved_today: i64,
    pub rejected_today: i64,
}

/// Get curator statistics.
pub async fn stats(
    State(state): State<Arc<ApiState>>,
    Curator(user): Curator,
) -> Result<Json<StatsResponse>> {
    let day_start = Utc::now().date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    let pending = state.store.count_pending_materials().await?;
    let approved_today = state
        .store
        .count_reviews_between(user.id, MaterialStatus::Approved, day_start, day_end)
        .await?;
    let rejected_today = state
        .store
        .count_reviews_between(user.id, MaterialStatus::Rejected, day_start, day_end)
        .await?;

    Ok(Json(StatsResponse {
        pending,
        approved_today,
        rejected_today,
    }))
}

/// Get pending materials for review.
pub async fn pending_materials(
    State(state): State<Arc<ApiState>>,
    Curator(_user): Curator,
) -> Result<Json<Vec<MaterialResponse>>> {
    let materials = state.store.pending_materials().await?;
    Ok(Json(materials.iter().map(MaterialResponse::from).collect()))
}

/// A row of the curator's review history.
#[derive(Serialize)]
pub struct ReviewHistoryResponse {
    pub id: i64,
    pub name: String,
    pub status: MaterialStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub feedback: String,
}

/// Get the curator's review history.
pub async fn review_history(
    State(state): State<Arc<ApiState>>,
    Curator(user): Curator,
) -> Result<Json<Vec<ReviewHistoryResponse>>> {
    let materials = state.store.review_history(user.id, 20).await?;

    let responses = materials
        .into_iter()
        .map(|row| ReviewHistoryResponse {
            id: row.material.id,
            name: row.material.name,
            status: row.material.status,
            reviewed_at: row.material.reviewed_at,
            feedback: row.material.feedback.unwrap_or_default(),
        })
        .collect();

    Ok(Json(responses))
}

/// Approve request body. Both fields are optional; the configured default
/// award applies when `points` is absent.
#[derive(Deserialize, Default)]
pub struct ApproveRequest {
    pub feedback: Option<String>,
    pub points: Option<i64>,
}

/// Outcome of a review decision.
#[derive(Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub material: MaterialResponse,
}

/// Approve a material.
pub async fn approve_material(
    State(state): State<Arc<ApiState>>,
    Curator(user): Curator,
    Path(material_id): Path<i64>,
    body: Option<Json<ApproveRequest>>,
) -> Result<Json<ReviewResponse>> {
    let request = body.map(|b| b.0).unwrap_or_default();
    let points = request.points.unwrap_or(state.config.default_award);

    let material = state
        .store
        .approve_material(material_id, &user, request.feedback, points)
        .await?;

    Ok(Json(ReviewResponse {
        success: true,
        message: format!("Material \"{}\" approved.", material.material.name),
        material: MaterialResponse::from(&material),
    }))
}

/// Reject request body.
#[derive(Deserialize, Default)]
pub struct RejectRequest {
    pub feedback: Option<String>,
}

/// Reject a material.
pub async fn reject_material(
    State(state): State<Arc<ApiState>>,
    Curator(user): Curator,
    Path(material_id): Path<i64>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<ReviewResponse>> {
    let request = body.map(|b| b.0).unwrap_or_default();
    let feedback = request.feedback.unwrap_or_default();

    let material = state
        .store
        .reject_material(material_id, &user, &feedback)
        .await?;

    Ok(Json(ReviewResponse {
        success: true,
        message: format!("Material \"{}\" rejected.", material.material.name),
        material: MaterialResponse::from(&material),
    }))
}
