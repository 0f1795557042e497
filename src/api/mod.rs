//! REST API for the reciclo daemon.
//!
//! Provides HTTP endpoints for:
//! - Producer dashboard (materials, collections, achievements, notifications)
//! - Curator dashboard (pending queue, approve/reject, review history)
//! - Admin dashboard (spaces, events, user approval)
//!
//! Routes are grouped by role; the extractors in [`auth`] enforce the role
//! and account status before a handler runs.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::store::Store;

/// Shared state for API handlers.
pub struct ApiState {
    /// Persistence facade.
    pub store: Store,

    /// Runtime configuration (default award, bind address).
    pub config: AppConfig,
}

impl ApiState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self { store, config }
    }
}

/// Build the API router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    // CORS configuration - allow requests from any origin for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status/health
        .route("/api/status", get(handlers::status::health))
        // Producer dashboard
        .route("/api/producer/stats", get(handlers::producer::stats))
        .route(
            "/api/producer/achievements",
            get(handlers::producer::achievements),
        )
        .route(
            "/api/producer/collections",
            get(handlers::producer::collections),
        )
        .route(
            "/api/producer/materials",
            get(handlers::producer::list_materials).post(handlers::producer::create_material),
        )
        .route(
            "/api/producer/collection-points",
            get(handlers::producer::collection_points),
        )
        .route(
            "/api/producer/events/today",
            get(handlers::producer::events_today),
        )
        .route(
            "/api/producer/notifications",
            get(handlers::producer::notifications),
        )
        .route(
            "/api/producer/notifications/:id/read",
            post(handlers::producer::read_notification),
        )
        // Curator dashboard
        .route("/api/curator/stats", get(handlers::curator::stats))
        .route(
            "/api/curator/pending-materials",
            get(handlers::curator::pending_materials),
        )
        .route(
            "/api/curator/review-history",
            get(handlers::curator::review_history),
        )
        .route(
            "/api/curator/materials/:id/approve",
            post(handlers::curator::approve_material),
        )
        .route(
            "/api/curator/materials/:id/reject",
            post(handlers::curator::reject_material),
        )
        // Admin dashboard
        .route("/api/admin/stats", get(handlers::admin::stats))
        .route(
            "/api/admin/spaces",
            get(handlers::admin::list_spaces).post(handlers::admin::create_space),
        )
        .route("/api/admin/spaces/:id", put(handlers::admin::update_space))
        .route(
            "/api/admin/events",
            get(handlers::admin::list_events).post(handlers::admin::create_event),
        )
        .route(
            "/api/admin/pending-users",
            get(handlers::admin::pending_users),
        )
        .route("/api/admin/active-users", get(handlers::admin::active_users))
        .route(
            "/api/admin/users/:id/approve",
            post(handlers::admin::approve_user),
        )
        .route(
            "/api/admin/users/:id/reject",
            post(handlers::admin::reject_user),
        )
        .route("/api/admin/users/:id", put(handlers::admin::update_user))
        // Middleware
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                // Only log requests/responses that are NOT 200 OK
                .on_request(())
                .on_response(|response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    let status = response.status();
                    if !status.is_success() {
                        tracing::warn!(
                            status = %status,
                            latency_ms = latency.as_millis(),
                            "request failed"
                        );
                    }
                })
        )
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("reciclo API listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
