//! Material entity and its review state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review status of a material.
///
/// `Pending` is the only non-terminal state: a material moves to
/// `Approved` or `Rejected` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MaterialStatus {
    /// Awaiting curator review.
    Pending,

    /// Accepted; points awarded and a collection record written.
    Approved,

    /// Declined with mandatory feedback.
    Rejected,
}

impl MaterialStatus {
    /// Human-readable status name.
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialStatus::Pending => "Awaiting review",
            MaterialStatus::Approved => "Approved",
            MaterialStatus::Rejected => "Rejected",
        }
    }
}

/// Recyclable material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MaterialCategory {
    Plastic,
    Glass,
    Paper,
    Metal,
    Electronics,
    Organic,
}

impl MaterialCategory {
    /// Human-readable category name.
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::Plastic => "Plastic",
            MaterialCategory::Glass => "Glass",
            MaterialCategory::Paper => "Paper",
            MaterialCategory::Metal => "Metal",
            MaterialCategory::Electronics => "Electronics",
            MaterialCategory::Organic => "Organic",
        }
    }
}

/// A waste material published by a producer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub category: MaterialCategory,
    pub description: String,
    pub location: String,

    /// Free-text amount, e.g. "20 kg" or "3 bags".
    pub quantity: Option<String>,

    pub status: MaterialStatus,

    /// Curator feedback; required when rejected.
    pub feedback: Option<String>,

    /// Points granted on approval, 0 otherwise.
    pub points_granted: i64,

    pub producer_id: i64,
    pub curator_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Material {
    /// Whether the material is still awaiting review.
    pub fn is_pending(&self) -> bool {
        self.status == MaterialStatus::Pending
    }
}
