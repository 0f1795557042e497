//! API request handlers.

pub mod admin;
pub mod curator;
pub mod producer;
pub mod status;

use serde::Serialize;

use crate::models::{Event, EventKind, EventStatus, Material, MaterialCategory, MaterialStatus};
use crate::store::{EventWithSpace, MaterialWithProducer};

/// Material payload shared by the producer and curator dashboards.
#[derive(Serialize)]
pub struct MaterialResponse {
    pub id: i64,
    pub name: String,
    pub category: MaterialCategory,
    pub category_display: &'static str,
    pub description: String,
    pub location: String,
    pub quantity: Option<String>,
    pub status: MaterialStatus,
    pub status_display: &'static str,
    pub feedback: Option<String>,
    pub points: i64,
    pub producer: String,
    pub producer_id: i64,
    pub curator_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&MaterialWithProducer> for MaterialResponse {
    fn from(row: &MaterialWithProducer) -> Self {
        let Material {
            id,
            ref name,
            category,
            ref description,
            ref location,
            ref quantity,
            status,
            ref feedback,
            points_granted,
            producer_id,
            curator_id,
            created_at,
            reviewed_at,
        } = row.material;

        MaterialResponse {
            id,
            name: name.clone(),
            category,
            category_display: category.display_name(),
            description: description.clone(),
            location: location.clone(),
            quantity: quantity.clone(),
            status,
            status_display: status.display_name(),
            feedback: feedback.clone(),
            points: points_granted,
            producer: row.producer_name.clone(),
            producer_id,
            curator_id,
            created_at,
            reviewed_at,
        }
    }
}

/// Event payload shared by the producer and admin dashboards.
#[derive(Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub kind_display: &'static str,
    pub status: EventStatus,
    pub status_display: &'static str,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub time: Option<String>,
    pub location: String,
    pub space_id: Option<i64>,
}

impl From<&EventWithSpace> for EventResponse {
    fn from(row: &EventWithSpace) -> Self {
        let Event {
            id,
            ref title,
            ref description,
            kind,
            status,
            starts_at,
            ref time,
            space_id,
            ref location,
            ..
        } = row.event;

        let location = row
            .space_name
            .clone()
            .or_else(|| location.clone())
            .unwrap_or_else(|| "Location not set".to_string());

        EventResponse {
            id,
            title: title.clone(),
            description: description.clone(),
            kind,
            kind_display: kind.display_name(),
            status,
            status_display: status.display_name(),
            starts_at,
            time: time.clone(),
            location,
            space_id,
        }
    }
}
