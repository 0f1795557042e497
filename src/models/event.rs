//! Event entity - scheduled recycling activities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventKind {
    Collection,
    Event,
    Course,
    Workshop,
}

impl EventKind {
    /// Human-readable kind name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::Collection => "Collection",
            EventKind::Event => "Event",
            EventKind::Course => "Course",
            EventKind::Workshop => "Workshop",
        }
    }
}

/// Scheduling status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Human-readable status name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "Scheduled",
            EventStatus::Ongoing => "Ongoing",
            EventStatus::Completed => "Completed",
            EventStatus::Cancelled => "Cancelled",
        }
    }
}

/// A scheduled activity, optionally hosted at a registered space.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub status: EventStatus,

    pub starts_at: DateTime<Utc>,

    /// Display time, free text ("14:00 - 17:00").
    pub time: Option<String>,

    /// Hosting space; custom `location` is used when absent.
    pub space_id: Option<i64>,
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
}
