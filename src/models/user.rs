//! User and notification entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a user acts under.
///
/// Stored as an integer column; the discriminants are part of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Role {
    /// Manages spaces, events, and user approval.
    Admin = 1,

    /// Reviews submitted materials.
    Curator = 2,

    /// Publishes materials and earns points.
    Producer = 3,
}

impl Role {
    /// Human-readable role name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Curator => "Curator",
            Role::Producer => "Producer",
        }
    }

    /// Lowercase key used in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Curator => "curator",
            Role::Producer => "producer",
        }
    }
}

/// Account lifecycle status.
///
/// Registration starts `pending`; an admin moves the account to `active`
/// or `inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    /// Human-readable status name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
        }
    }
}

/// A registered user.
///
/// Credentials live in the upstream auth gateway; this row carries only
/// profile, role, and the point balance the review workflow grows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,

    /// Non-negative, only ever increased by material approvals.
    pub points: i64,

    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl User {
    /// Full name, falling back to the username.
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.username.clone(),
        }
    }

    /// Up to two uppercase initials for avatar badges.
    pub fn initials(&self) -> String {
        let name = self.full_name();
        let initials: String = name
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Achievement,
    Reminder,
}

/// A message delivered to a user's dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(first: Option<&str>, last: Option<&str>, username: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            role: Role::Producer,
            status: UserStatus::Active,
            points: 0,
            created_at: Utc::now(),
            last_active_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        let user = make_user(Some("Joan"), Some("Rivers"), "joan");
        assert_eq!(user.full_name(), "Joan Rivers");

        let user = make_user(Some("Joan"), None, "joan");
        assert_eq!(user.full_name(), "joan");

        let user = make_user(None, None, "joan");
        assert_eq!(user.full_name(), "joan");
    }

    #[test]
    fn test_initials() {
        let user = make_user(Some("Joan"), Some("Rivers"), "joan");
        assert_eq!(user.initials(), "JR");

        // Falls back to the username's first letter.
        let user = make_user(None, None, "joan");
        assert_eq!(user.initials(), "J");
    }

    #[test]
    fn test_role_discriminants() {
        assert_eq!(Role::Admin as i32, 1);
        assert_eq!(Role::Curator as i32, 2);
        assert_eq!(Role::Producer as i32, 3);
    }
}
