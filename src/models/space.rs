//! Space entity - physical collection points and venues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a space is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SpaceKind {
    /// Drop-off point for materials.
    Collection,

    /// Venue for events.
    Event,

    /// Venue for courses.
    Course,
}

impl SpaceKind {
    /// Human-readable kind name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SpaceKind::Collection => "Collection",
            SpaceKind::Event => "Event",
            SpaceKind::Course => "Course",
        }
    }
}

/// A physical location managed by admins.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Space {
    pub id: i64,
    pub name: String,
    pub kind: SpaceKind,
    pub address: String,

    /// Opening hours, free text.
    pub hours: Option<String>,

    pub description: Option<String>,
    pub active: bool,

    /// Optional map coordinates.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
