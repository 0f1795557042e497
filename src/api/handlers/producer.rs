//! Producer dashboard handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::achievements;
use crate::api::auth::Producer;
use crate::api::ApiState;
use crate::error::Result;
use crate::models::{Collection, MaterialCategory, Notification, Space};
use crate::review::NewMaterial;

use super::{EventResponse, MaterialResponse};

/// Producer dashboard statistics.
#[derive(Serialize)]
pub struct StatsResponse {
    pub points: i64,
    pub collections_completed: i64,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
}

/// Get producer statistics.
pub async fn stats(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
) -> Result<Json<StatsResponse>> {
    let collections_completed = state.store.count_collections_by_producer(user.id).await?;
    let catalog = state.store.achievement_catalog().await?;

    Ok(Json(StatsResponse {
        points: user.points,
        collections_completed,
        achievements_unlocked: achievements::unlocked_count(user.points, &catalog),
        achievements_total: catalog.len(),
    }))
}

/// Catalog entry with the caller's progress folded in.
#[derive(Serialize)]
pub struct AchievementResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub points_required: i64,
    pub unlocked: bool,
    pub points_remaining: i64,
}

/// Get producer achievements.
pub async fn achievements(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
) -> Result<Json<Vec<AchievementResponse>>> {
    let catalog = state.store.achievement_catalog().await?;

    let responses = catalog
        .into_iter()
        .map(|achievement| {
            let progress = achievements::progress(user.points, &achievement);
            AchievementResponse {
                id: achievement.id,
                name: achievement.name,
                description: achievement.description,
                icon: achievement.icon,
                points_required: achievement.points_required,
                unlocked: progress.unlocked,
                points_remaining: progress.points_remaining,
            }
        })
        .collect();

    Ok(Json(responses))
}

/// A row of the producer's collection history.
#[derive(Serialize)]
pub struct CollectionResponse {
    pub id: i64,
    pub material_name: String,
    pub category: MaterialCategory,
    pub category_display: &'static str,
    pub quantity: Option<String>,
    pub points: i64,
    pub feedback: Option<String>,
    pub collected_at: DateTime<Utc>,
}

impl From<&Collection> for CollectionResponse {
    fn from(collection: &Collection) -> Self {
        CollectionResponse {
            id: collection.id,
            material_name: collection.material_name.clone(),
            category: collection.category,
            category_display: collection.category.display_name(),
            quantity: collection.quantity.clone(),
            points: collection.points,
            feedback: collection.feedback.clone(),
            collected_at: collection.collected_at,
        }
    }
}

/// Get producer collection history.
pub async fn collections(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
) -> Result<Json<Vec<CollectionResponse>>> {
    let collections = state.store.collections_by_producer(user.id, 20).await?;
    Ok(Json(collections.iter().map(CollectionResponse::from).collect()))
}

/// Get the producer's published materials.
pub async fn list_materials(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
) -> Result<Json<Vec<MaterialResponse>>> {
    let materials = state.store.materials_by_producer(user.id).await?;
    Ok(Json(materials.iter().map(MaterialResponse::from).collect()))
}

/// Publish a new material for review.
pub async fn create_material(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
    Json(new): Json<NewMaterial>,
) -> Result<impl IntoResponse> {
    let material = state.store.submit_material(&user, new).await?;
    Ok((StatusCode::CREATED, Json(MaterialResponse::from(&material))))
}

/// A nearby drop-off point.
#[derive(Serialize)]
pub struct CollectionPointResponse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub hours: String,
    pub distance: String,
}

impl From<&Space> for CollectionPointResponse {
    fn from(space: &Space) -> Self {
        CollectionPointResponse {
            id: space.id,
            name: space.name.clone(),
            address: space.address.clone(),
            hours: space
                .hours
                .clone()
                .unwrap_or_else(|| "Hours not set".to_string()),
            // Would need geolocation to calculate.
            distance: "N/A".to_string(),
        }
    }
}

/// Get nearby collection points.
pub async fn collection_points(
    State(state): State<Arc<ApiState>>,
    Producer(_user): Producer,
) -> Result<Json<Vec<CollectionPointResponse>>> {
    let spaces = state.store.active_collection_spaces().await?;
    Ok(Json(spaces.iter().map(CollectionPointResponse::from).collect()))
}

/// Get events happening today.
pub async fn events_today(
    State(state): State<Arc<ApiState>>,
    Producer(_user): Producer,
) -> Result<Json<Vec<EventResponse>>> {
    let day_start = Utc::now().date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    let events = state.store.events_between(day_start, day_end).await?;
    Ok(Json(events.iter().map(EventResponse::from).collect()))
}

/// Get the producer's notifications, newest first.
pub async fn notifications(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.store.notifications_for(user.id).await?;
    Ok(Json(notifications))
}

/// Mark one of the producer's notifications as read.
pub async fn read_notification(
    State(state): State<Arc<ApiState>>,
    Producer(user): Producer,
    Path(id): Path<i64>,
) -> Result<Json<Notification>> {
    let notification = state.store.mark_notification_read(user.id, id).await?;
    Ok(Json(notification))
}
