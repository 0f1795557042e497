//! Typed queries over the entity tables.
//!
//! [`Store`] is the single persistence facade: handlers and the review
//! workflow go through it rather than holding raw pool references. Reads
//! are one query each; the multi-statement review transitions live in
//! [`crate::review`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    Achievement, Collection, Event, EventKind, EventStatus, Material, MaterialStatus,
    Notification, Role, Space, SpaceKind, User, UserStatus,
};

/// Materials are usually shown with who submitted them; this is the joined
/// row shape every material query returns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MaterialWithProducer {
    #[sqlx(flatten)]
    pub material: Material,
    pub producer_name: String,
}

const SELECT_MATERIAL: &str = "SELECT m.*, \
    COALESCE(u.first_name || ' ' || u.last_name, u.username) AS producer_name \
    FROM materials m JOIN users u ON u.id = m.producer_id";

/// Event joined with the hosting space's name, when one is linked.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventWithSpace {
    #[sqlx(flatten)]
    pub event: Event,
    pub space_name: Option<String>,
}

const SELECT_EVENT: &str = "SELECT e.*, s.name AS space_name \
    FROM events e LEFT JOIN spaces s ON s.id = e.space_id";

/// Fields an admin may change on a user. Absent fields keep their value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Input for registering a space.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSpace {
    pub name: String,
    pub kind: SpaceKind,
    pub address: String,
    pub hours: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Fields an admin may change on a space. Absent fields keep their value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SpaceChanges {
    pub name: Option<String>,
    pub kind: Option<SpaceKind>,
    pub address: Option<String>,
    pub hours: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Input for scheduling an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub kind: EventKind,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub time: Option<String>,
    pub space_id: Option<i64>,
    pub location: Option<String>,
}

/// Persistence facade over the entity tables.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for transactional workflows.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Users ===

    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_users_by_status(&self, status: UserStatus) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn pending_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users WHERE status = ? ORDER BY created_at")
            .bind(UserStatus::Pending)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn active_users(&self, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT * FROM users WHERE status = ? ORDER BY last_active_at DESC LIMIT ?",
        )
        .bind(UserStatus::Active)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Activate a pending account.
    pub async fn approve_user(&self, id: i64) -> Result<User> {
        self.resolve_pending_user(id, UserStatus::Active).await
    }

    /// Decline a pending account.
    pub async fn reject_user(&self, id: i64) -> Result<User> {
        self.resolve_pending_user(id, UserStatus::Inactive).await
    }

    /// Status check and transition in one statement, so two admins racing
    /// on the same registration cannot both "win".
    async fn resolve_pending_user(&self, id: i64, to: UserStatus) -> Result<User> {
        let updated = sqlx::query("UPDATE users SET status = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(id)
            .bind(UserStatus::Pending)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return match self.user_by_id(id).await? {
                Some(_) => Err(Error::UserNotPending),
                None => Err(Error::NotFound("user")),
            };
        }

        debug!(user_id = id, status = ?to, "pending user resolved");

        self.user_by_id(id)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    pub async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User> {
        let user = self.user_by_id(id).await?.ok_or(Error::NotFound("user"))?;

        let first_name = changes.first_name.or(user.first_name);
        let last_name = changes.last_name.or(user.last_name);
        let email = changes.email.unwrap_or(user.email);
        let role = changes.role.unwrap_or(user.role);
        let status = changes.status.unwrap_or(user.status);

        sqlx::query(
            "UPDATE users
                 SET first_name = ?, last_name = ?, email = ?, role = ?, status = ?,
                     last_active_at = ?
             WHERE id = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::Duplicate,
            _ => Error::from(e),
        })?;

        self.user_by_id(id)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    pub async fn touch_last_active(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_active_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // === Materials (reads; transitions live in `review`) ===

    pub async fn material_by_id(&self, id: i64) -> Result<Option<Material>> {
        let material = sqlx::query_as("SELECT * FROM materials WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(material)
    }

    pub async fn material_with_producer(&self, id: i64) -> Result<Option<MaterialWithProducer>> {
        let sql = format!("{SELECT_MATERIAL} WHERE m.id = ?");
        let material = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(material)
    }

    pub async fn materials_by_producer(&self, producer_id: i64) -> Result<Vec<MaterialWithProducer>> {
        let sql =
            format!("{SELECT_MATERIAL} WHERE m.producer_id = ? ORDER BY m.created_at DESC");
        let materials = sqlx::query_as(&sql)
            .bind(producer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(materials)
    }

    pub async fn pending_materials(&self) -> Result<Vec<MaterialWithProducer>> {
        let sql =
            format!("{SELECT_MATERIAL} WHERE m.status = ? ORDER BY m.created_at DESC");
        let materials = sqlx::query_as(&sql)
            .bind(MaterialStatus::Pending)
            .fetch_all(&self.pool)
            .await?;
        Ok(materials)
    }

    pub async fn count_pending_materials(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE status = ?")
            .bind(MaterialStatus::Pending)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Latest materials this curator has reviewed.
    pub async fn review_history(
        &self,
        curator_id: i64,
        limit: i64,
    ) -> Result<Vec<MaterialWithProducer>> {
        let sql = format!(
            "{SELECT_MATERIAL}
             WHERE m.curator_id = ? AND m.status <> ?
             ORDER BY m.reviewed_at DESC LIMIT ?"
        );
        let materials = sqlx::query_as(&sql)
            .bind(curator_id)
            .bind(MaterialStatus::Pending)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(materials)
    }

    /// Reviews with the given outcome by this curator inside [from, to).
    pub async fn count_reviews_between(
        &self,
        curator_id: i64,
        status: MaterialStatus,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM materials
             WHERE curator_id = ? AND status = ? AND reviewed_at >= ? AND reviewed_at < ?",
        )
        .bind(curator_id)
        .bind(status)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // === Collections ===

    pub async fn collections_by_producer(
        &self,
        producer_id: i64,
        limit: i64,
    ) -> Result<Vec<Collection>> {
        let collections = sqlx::query_as(
            "SELECT * FROM collections WHERE producer_id = ?
             ORDER BY collected_at DESC LIMIT ?",
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(collections)
    }

    pub async fn count_collections_by_producer(&self, producer_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM collections WHERE producer_id = ?")
            .bind(producer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // === Achievements ===

    /// The static catalog, in display order.
    pub async fn achievement_catalog(&self) -> Result<Vec<Achievement>> {
        let catalog = sqlx::query_as("SELECT * FROM achievements ORDER BY position")
            .fetch_all(&self.pool)
            .await?;
        Ok(catalog)
    }

    // === Spaces ===

    pub async fn spaces(&self) -> Result<Vec<Space>> {
        let spaces = sqlx::query_as("SELECT * FROM spaces ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(spaces)
    }

    /// Active drop-off points shown to producers.
    pub async fn active_collection_spaces(&self) -> Result<Vec<Space>> {
        let spaces = sqlx::query_as(
            "SELECT * FROM spaces WHERE kind = ? AND active = 1 ORDER BY name",
        )
        .bind(SpaceKind::Collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(spaces)
    }

    pub async fn count_spaces(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM spaces")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create_space(&self, new: NewSpace) -> Result<Space> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO spaces
                 (name, kind, address, hours, description, active, latitude, longitude,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.kind)
        .bind(&new.address)
        .bind(&new.hours)
        .bind(&new.description)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(space = %new.name, "space created");
        self.space_by_id(result.last_insert_rowid()).await
    }

    pub async fn update_space(&self, id: i64, changes: SpaceChanges) -> Result<Space> {
        let space = self.space_by_id(id).await?;

        let name = changes.name.unwrap_or(space.name);
        let kind = changes.kind.unwrap_or(space.kind);
        let address = changes.address.unwrap_or(space.address);
        let hours = changes.hours.or(space.hours);
        let description = changes.description.or(space.description);
        let active = changes.active.unwrap_or(space.active);

        sqlx::query(
            "UPDATE spaces
                 SET name = ?, kind = ?, address = ?, hours = ?, description = ?,
                     active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(kind)
        .bind(address)
        .bind(hours)
        .bind(description)
        .bind(active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.space_by_id(id).await
    }

    async fn space_by_id(&self, id: i64) -> Result<Space> {
        let space = sqlx::query_as("SELECT * FROM spaces WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound("space"))?;
        Ok(space)
    }

    // === Events ===

    pub async fn upcoming_events(&self, limit: i64) -> Result<Vec<EventWithSpace>> {
        let sql = format!("{SELECT_EVENT} WHERE e.starts_at >= ? ORDER BY e.starts_at LIMIT ?");
        let events = sqlx::query_as(&sql)
            .bind(Utc::now())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    /// Scheduled or ongoing events starting inside [from, to).
    pub async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventWithSpace>> {
        let sql = format!(
            "{SELECT_EVENT}
             WHERE e.starts_at >= ? AND e.starts_at < ? AND e.status IN (?, ?)
             ORDER BY e.starts_at"
        );
        let events = sqlx::query_as(&sql)
            .bind(from)
            .bind(to)
            .bind(EventStatus::Scheduled)
            .bind(EventStatus::Ongoing)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    /// Events still on the calendar (scheduled or ongoing).
    pub async fn count_open_events(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status IN (?, ?)")
            .bind(EventStatus::Scheduled)
            .bind(EventStatus::Ongoing)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create_event(&self, new: NewEvent) -> Result<EventWithSpace> {
        let result = sqlx::query(
            "INSERT INTO events
                 (title, description, kind, status, starts_at, time, space_id, location,
                  created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.kind)
        .bind(EventStatus::Scheduled)
        .bind(new.starts_at)
        .bind(&new.time)
        .bind(new.space_id)
        .bind(&new.location)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(event = %new.title, "event created");

        let sql = format!("{SELECT_EVENT} WHERE e.id = ?");
        let event = sqlx::query_as(&sql)
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    // === Notifications ===

    pub async fn notifications_for(&self, user_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    /// Mark one of the user's own notifications read.
    pub async fn mark_notification_read(&self, user_id: i64, id: i64) -> Result<Notification> {
        let updated = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound("notification"));
        }

        let notification = sqlx::query_as("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn test_resolve_pending_user() {
        let store = Store::new(testing::pool().await);
        let pending =
            testing::insert_user(store.pool(), "newbie", Role::Producer, UserStatus::Pending, 0)
                .await;

        let approved = store.approve_user(pending.id).await.unwrap();
        assert_eq!(approved.status, UserStatus::Active);

        // A second resolution attempt is a conflict, not a re-apply.
        assert!(matches!(
            store.reject_user(pending.id).await,
            Err(Error::UserNotPending)
        ));

        assert!(matches!(
            store.approve_user(9999).await,
            Err(Error::NotFound("user"))
        ));
    }

    #[tokio::test]
    async fn test_reject_user_goes_inactive() {
        let store = Store::new(testing::pool().await);
        let pending =
            testing::insert_user(store.pool(), "declined", Role::Producer, UserStatus::Pending, 0)
                .await;

        let rejected = store.reject_user(pending.id).await.unwrap();
        assert_eq!(rejected.status, UserStatus::Inactive);
    }

    #[tokio::test]
    async fn test_update_user_partial_and_duplicate_email() {
        let store = Store::new(testing::pool().await);
        let user =
            testing::insert_user(store.pool(), "alice", Role::Producer, UserStatus::Active, 0)
                .await;
        let other =
            testing::insert_user(store.pool(), "bob", Role::Producer, UserStatus::Active, 0).await;

        let updated = store
            .update_user(
                user.id,
                UserChanges {
                    first_name: Some("Alice".to_string()),
                    role: Some(Role::Curator),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("Alice"));
        assert_eq!(updated.role, Role::Curator);
        // Untouched fields survive.
        assert_eq!(updated.email, "alice@example.com");

        let result = store
            .update_user(
                other.id,
                UserChanges {
                    email: Some("alice@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Duplicate)));
    }

    #[tokio::test]
    async fn test_pending_materials_carry_producer_name() {
        let store = Store::new(testing::pool().await);
        let producer =
            testing::insert_user(store.pool(), "carol", Role::Producer, UserStatus::Active, 0)
                .await;
        testing::insert_material(store.pool(), producer.id, "cardboard boxes").await;

        let pending = store.pending_materials().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].material.name, "cardboard boxes");
        // No first/last name set, so the username stands in.
        assert_eq!(pending[0].producer_name, "carol");
    }

    #[tokio::test]
    async fn test_mark_notification_read_enforces_ownership() {
        let store = Store::new(testing::pool().await);
        let owner =
            testing::insert_user(store.pool(), "dana", Role::Producer, UserStatus::Active, 0)
                .await;
        let stranger =
            testing::insert_user(store.pool(), "eve", Role::Producer, UserStatus::Active, 0).await;

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message, read, created_at)
             VALUES (?, 'info', 'hello', 'welcome', 0, ?)",
        )
        .bind(owner.id)
        .bind(chrono::Utc::now())
        .execute(store.pool())
        .await
        .unwrap();

        let list = store.notifications_for(owner.id).await.unwrap();
        assert_eq!(list.len(), 1);
        let id = list[0].id;

        // Someone else's notification looks like it does not exist.
        assert!(matches!(
            store.mark_notification_read(stranger.id, id).await,
            Err(Error::NotFound("notification"))
        ));

        let read = store.mark_notification_read(owner.id, id).await.unwrap();
        assert!(read.read);
    }
}
