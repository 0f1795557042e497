//! Admin dashboard handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::auth::Admin;
use crate::api::ApiState;
use crate::error::Result;
use crate::models::{Space, SpaceKind, User, UserStatus};
use crate::store::{NewEvent, NewSpace, SpaceChanges, UserChanges};

use super::EventResponse;

/// Admin dashboard statistics.
#[derive(Serialize)]
pub struct StatsResponse {
    pub total_spaces: i64,
    pub scheduled_events: i64,
    pub pending_users: i64,
    pub total_users: i64,
    pub active_users: i64,
}

/// Get admin dashboard statistics.
pub async fn stats(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
) -> Result<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        total_spaces: state.store.count_spaces().await?,
        scheduled_events: state.store.count_open_events().await?,
        pending_users: state.store.count_users_by_status(UserStatus::Pending).await?,
        total_users: state.store.count_users().await?,
        active_users: state.store.count_users_by_status(UserStatus::Active).await?,
    }))
}

/// Space payload for the admin dashboard.
#[derive(Serialize)]
pub struct SpaceResponse {
    pub id: i64,
    pub name: String,
    pub kind: SpaceKind,
    pub kind_display: &'static str,
    pub address: String,
    pub hours: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&Space> for SpaceResponse {
    fn from(space: &Space) -> Self {
        SpaceResponse {
            id: space.id,
            name: space.name.clone(),
            kind: space.kind,
            kind_display: space.kind.display_name(),
            address: space.address.clone(),
            hours: space.hours.clone(),
            description: space.description.clone(),
            active: space.active,
            latitude: space.latitude,
            longitude: space.longitude,
        }
    }
}

/// Get all spaces.
pub async fn list_spaces(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
) -> Result<Json<Vec<SpaceResponse>>> {
    let spaces = state.store.spaces().await?;
    Ok(Json(spaces.iter().map(SpaceResponse::from).collect()))
}

/// Create a new space.
pub async fn create_space(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Json(new): Json<NewSpace>,
) -> Result<impl IntoResponse> {
    validate_space(&new)?;

    let space = state.store.create_space(new).await?;
    Ok((StatusCode::CREATED, Json(SpaceResponse::from(&space))))
}

fn validate_space(new: &NewSpace) -> Result<()> {
    if new.name.trim().is_empty() {
        return Err(crate::error::Error::MissingField("name"));
    }
    if new.address.trim().is_empty() {
        return Err(crate::error::Error::MissingField("address"));
    }
    Ok(())
}

/// Update a space.
pub async fn update_space(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Path(space_id): Path<i64>,
    Json(changes): Json<SpaceChanges>,
) -> Result<Json<SpaceResponse>> {
    let space = state.store.update_space(space_id, changes).await?;
    Ok(Json(SpaceResponse::from(&space)))
}

/// Get upcoming events.
pub async fn list_events(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
) -> Result<Json<Vec<EventResponse>>> {
    let events = state.store.upcoming_events(20).await?;
    Ok(Json(events.iter().map(EventResponse::from).collect()))
}

/// Create a new event.
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Json(new): Json<NewEvent>,
) -> Result<impl IntoResponse> {
    if new.title.trim().is_empty() {
        return Err(crate::error::Error::MissingField("title"));
    }

    let event = state.store.create_event(new).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(&event))))
}

/// A registration awaiting approval.
#[derive(Serialize)]
pub struct PendingUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub initials: String,
}

/// Get pending users for approval.
pub async fn pending_users(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
) -> Result<Json<Vec<PendingUserResponse>>> {
    let users = state.store.pending_users().await?;

    let responses = users
        .iter()
        .map(|user| PendingUserResponse {
            id: user.id,
            name: user.full_name(),
            email: user.email.clone(),
            initials: user.initials(),
        })
        .collect();

    Ok(Json(responses))
}

/// An active account, with a humanized activity timestamp.
#[derive(Serialize)]
pub struct ActiveUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub role_display: &'static str,
    pub initials: String,
    pub last_activity: String,
}

/// Get active users, most recently seen first.
pub async fn active_users(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
) -> Result<Json<Vec<ActiveUserResponse>>> {
    let now = Utc::now();
    let users = state.store.active_users(50).await?;

    let responses = users
        .iter()
        .map(|user| ActiveUserResponse {
            id: user.id,
            name: user.full_name(),
            email: user.email.clone(),
            role: user.role.as_str(),
            role_display: user.role.display_name(),
            initials: user.initials(),
            last_activity: last_activity_label(now, user.last_active_at),
        })
        .collect();

    Ok(Json(responses))
}

/// "2 days ago" style label for the dashboard's activity column.
fn last_activity_label(now: DateTime<Utc>, last_active: DateTime<Utc>) -> String {
    let elapsed = now - last_active;

    let days = elapsed.num_days();
    if days > 1 {
        return format!("{days} days ago");
    }
    if days == 1 {
        return "1 day ago".to_string();
    }

    let hours = elapsed.num_hours();
    if hours > 1 {
        return format!("{hours} hours ago");
    }
    if hours == 1 {
        return "1 hour ago".to_string();
    }

    let minutes = elapsed.num_minutes();
    if minutes >= 1 {
        return format!("{minutes} min ago");
    }

    "Just now".to_string()
}

/// Outcome of a user approval decision.
#[derive(Serialize)]
pub struct UserDecisionResponse {
    pub success: bool,
    pub message: String,
}

/// Approve a pending user.
pub async fn approve_user(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDecisionResponse>> {
    let user = state.store.approve_user(user_id).await?;

    Ok(Json(UserDecisionResponse {
        success: true,
        message: format!("User {} approved.", user.full_name()),
    }))
}

/// Reject a pending user.
pub async fn reject_user(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDecisionResponse>> {
    let user = state.store.reject_user(user_id).await?;

    Ok(Json(UserDecisionResponse {
        success: true,
        message: format!("User {} rejected.", user.full_name()),
    }))
}

/// User payload returned from admin updates.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub role_display: &'static str,
    pub status: UserStatus,
    pub status_display: &'static str,
    pub points: i64,
    pub last_active_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role.as_str(),
            role_display: user.role.display_name(),
            status: user.status,
            status_display: user.status.display_name(),
            points: user.points,
            last_active_at: user.last_active_at,
        }
    }
}

/// Update user information.
pub async fn update_user(
    State(state): State<Arc<ApiState>>,
    Admin(_user): Admin,
    Path(user_id): Path<i64>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<UserResponse>> {
    let user = state.store.update_user(user_id, changes).await?;
    Ok(Json(UserResponse::from(&user)))
}
