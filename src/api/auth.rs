//! Request identity and role guards.
//!
//! Sessions live in the fronting gateway: it authenticates the browser and
//! forwards the user id in the `x-user-id` header. The extractors here turn
//! that id into a loaded [`User`] and enforce role + active status before
//! any handler body runs, so a denied request has no side effects.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::ApiState;
use crate::error::Error;
use crate::models::{Role, User, UserStatus};

/// Header the gateway uses to forward the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, any role, any status.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or(Error::Unauthenticated)?;

        let user = state
            .store
            .user_by_id(id)
            .await?
            .ok_or(Error::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// Role + active-status gate shared by the role extractors.
async fn require(parts: &mut Parts, state: &Arc<ApiState>, role: Role) -> Result<User, Error> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

    if user.status != UserStatus::Active {
        return Err(Error::InactiveAccount);
    }
    if user.role != role {
        return Err(Error::Forbidden);
    }

    // The guard passed; record the activity the admin dashboard shows.
    state.store.touch_last_active(user.id).await?;

    Ok(user)
}

/// An active admin.
pub struct Admin(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for Admin {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::Admin).await.map(Admin)
    }
}

/// An active curator.
pub struct Curator(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for Curator {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::Curator).await.map(Curator)
    }
}

/// An active producer.
pub struct Producer(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for Producer {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::Producer).await.map(Producer)
    }
}
