//! Achievement catalog and collection history entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::material::MaterialCategory;

/// A badge definition from the static catalog.
///
/// Seeded once at startup and never mutated at runtime. Whether a user has
/// unlocked an achievement is derived from their point balance, never stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Emoji shown on the dashboard.
    pub icon: String,

    pub points_required: i64,

    /// Display order, ascending.
    pub position: i64,
}

/// Immutable record of an approved material.
///
/// Denormalized snapshot: the name/category/quantity are copied at approval
/// time so later edits to users never rewrite history. Exactly one row
/// exists per approved material.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Collection {
    pub id: i64,
    pub material_name: String,
    pub category: MaterialCategory,
    pub quantity: Option<String>,
    pub points: i64,
    pub feedback: Option<String>,

    pub producer_id: i64,
    pub material_id: Option<i64>,

    pub collected_at: DateTime<Utc>,
}
