//! Material review workflow.
//!
//! A material is reviewed at most once: the transition out of `pending` is
//! guarded by a conditional `UPDATE ... AND status = 'pending'`, so when two
//! curators race on the same material exactly one statement takes effect and
//! the loser sees [`Error::AlreadyReviewed`]. Approval bundles the status
//! change, the point award, the collection record, and any achievement
//! notifications into one transaction - all of it lands or none of it does.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{Sqlite, Transaction};
use tracing::info;

use crate::achievements;
use crate::error::{Error, Result};
use crate::models::{Material, MaterialCategory, MaterialStatus, NotificationKind, User};
use crate::store::{MaterialWithProducer, Store};

/// Input for publishing a material.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub category: MaterialCategory,
    pub description: String,
    pub location: String,
    pub quantity: Option<String>,
}

impl NewMaterial {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::MissingField("description"));
        }
        if self.location.trim().is_empty() {
            return Err(Error::MissingField("location"));
        }
        Ok(())
    }
}

impl Store {
    /// Publish a material for review.
    ///
    /// The material starts `pending` with no curator and no points.
    pub async fn submit_material(
        &self,
        producer: &User,
        new: NewMaterial,
    ) -> Result<MaterialWithProducer> {
        new.validate()?;

        let result = sqlx::query(
            "INSERT INTO materials
                 (name, category, description, location, quantity, status,
                  points_granted, producer_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(new.name.trim())
        .bind(new.category)
        .bind(new.description.trim())
        .bind(new.location.trim())
        .bind(&new.quantity)
        .bind(MaterialStatus::Pending)
        .bind(producer.id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(material_id = id, producer_id = producer.id, "material submitted");

        self.material_with_producer(id)
            .await?
            .ok_or(Error::NotFound("material"))
    }

    /// Approve a pending material.
    ///
    /// Awards `points` to the producer and appends the collection record.
    /// Fails with [`Error::AlreadyReviewed`] if the material has left
    /// `pending`, leaving every row untouched.
    pub async fn approve_material(
        &self,
        material_id: i64,
        curator: &User,
        feedback: Option<String>,
        points: i64,
    ) -> Result<MaterialWithProducer> {
        if points < 0 {
            return Err(Error::InvalidPoints);
        }

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            "UPDATE materials
                 SET status = ?, curator_id = ?, reviewed_at = ?, feedback = ?,
                     points_granted = ?
             WHERE id = ? AND status = ?",
        )
        .bind(MaterialStatus::Approved)
        .bind(curator.id)
        .bind(Utc::now())
        .bind(&feedback)
        .bind(points)
        .bind(material_id)
        .bind(MaterialStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(reviewed_or_missing(&mut tx, material_id).await?);
        }

        let material: Material = sqlx::query_as("SELECT * FROM materials WHERE id = ?")
            .bind(material_id)
            .fetch_one(&mut *tx)
            .await?;

        let producer: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(material.producer_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
            .bind(points)
            .bind(producer.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO collections
                 (material_name, category, quantity, points, feedback, producer_id,
                  material_id, collected_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&material.name)
        .bind(material.category)
        .bind(&material.quantity)
        .bind(points)
        .bind(&feedback)
        .bind(producer.id)
        .bind(material.id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        notify_crossed_achievements(&mut tx, &producer, points).await?;

        tx.commit().await?;

        info!(
            material_id,
            curator_id = curator.id,
            producer_id = producer.id,
            points,
            "material approved"
        );

        self.material_with_producer(material_id)
            .await?
            .ok_or(Error::NotFound("material"))
    }

    /// Reject a pending material.
    ///
    /// Feedback is mandatory; nothing else changes - no points, no
    /// collection record.
    pub async fn reject_material(
        &self,
        material_id: i64,
        curator: &User,
        feedback: &str,
    ) -> Result<MaterialWithProducer> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(Error::FeedbackRequired);
        }

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            "UPDATE materials
                 SET status = ?, curator_id = ?, reviewed_at = ?, feedback = ?
             WHERE id = ? AND status = ?",
        )
        .bind(MaterialStatus::Rejected)
        .bind(curator.id)
        .bind(Utc::now())
        .bind(feedback)
        .bind(material_id)
        .bind(MaterialStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(reviewed_or_missing(&mut tx, material_id).await?);
        }

        tx.commit().await?;

        info!(material_id, curator_id = curator.id, "material rejected");

        self.material_with_producer(material_id)
            .await?
            .ok_or(Error::NotFound("material"))
    }
}

/// The guarded update matched nothing: either the material does not exist
/// or another reviewer already settled it.
async fn reviewed_or_missing(
    tx: &mut Transaction<'_, Sqlite>,
    material_id: i64,
) -> Result<Error> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE id = ?")
        .bind(material_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(if exists == 0 {
        Error::NotFound("material")
    } else {
        Error::AlreadyReviewed
    })
}

/// Record an achievement notification for every threshold this award
/// carried the producer across.
async fn notify_crossed_achievements(
    tx: &mut Transaction<'_, Sqlite>,
    producer: &User,
    points: i64,
) -> Result<()> {
    let catalog = sqlx::query_as("SELECT * FROM achievements ORDER BY position")
        .fetch_all(&mut **tx)
        .await?;

    for achievement in achievements::crossed(producer.points, producer.points + points, &catalog) {
        let message = format!(
            "You reached {} points and unlocked {} {}.",
            achievement.points_required, achievement.icon, achievement.name
        );

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message, read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(producer.id)
        .bind(NotificationKind::Achievement)
        .bind(&achievement.name)
        .bind(message)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;
    use crate::models::{Role, UserStatus};

    async fn setup() -> (Store, User, User) {
        let store = Store::new(testing::pool().await);
        let producer =
            testing::insert_user(store.pool(), "producer", Role::Producer, UserStatus::Active, 0)
                .await;
        let curator =
            testing::insert_user(store.pool(), "curator", Role::Curator, UserStatus::Active, 0)
                .await;
        (store, producer, curator)
    }

    async fn user_points(store: &Store, id: i64) -> i64 {
        store.user_by_id(id).await.unwrap().unwrap().points
    }

    #[tokio::test]
    async fn test_submit_starts_pending() {
        let (store, producer, _) = setup().await;

        let submitted = store
            .submit_material(
                &producer,
                NewMaterial {
                    name: "PET bottles".to_string(),
                    category: MaterialCategory::Plastic,
                    description: "clean, crushed".to_string(),
                    location: "depot 4".to_string(),
                    quantity: Some("12 kg".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(submitted.material.status, MaterialStatus::Pending);
        assert_eq!(submitted.material.points_granted, 0);
        assert!(submitted.material.curator_id.is_none());
        assert!(submitted.material.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_fields() {
        let (store, producer, _) = setup().await;

        let result = store
            .submit_material(
                &producer,
                NewMaterial {
                    name: "  ".to_string(),
                    category: MaterialCategory::Glass,
                    description: "jars".to_string(),
                    location: "depot 1".to_string(),
                    quantity: None,
                },
            )
            .await;

        assert!(matches!(result, Err(Error::MissingField("name"))));
    }

    #[tokio::test]
    async fn test_approve_awards_points_and_records_collection() {
        let (store, producer, curator) = setup().await;
        let material_id = testing::insert_material(store.pool(), producer.id, "glass jars").await;

        let approved = store
            .approve_material(material_id, &curator, Some("great batch".to_string()), 50)
            .await
            .unwrap();

        assert_eq!(approved.material.status, MaterialStatus::Approved);
        assert_eq!(approved.material.points_granted, 50);
        assert_eq!(approved.material.curator_id, Some(curator.id));
        assert!(approved.material.reviewed_at.is_some());

        // Exactly +50 on the producer.
        assert_eq!(user_points(&store, producer.id).await, 50);

        // Exactly one snapshot row, mirroring the material.
        let collections = store.collections_by_producer(producer.id, 20).await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].material_name, "glass jars");
        assert_eq!(collections[0].category, MaterialCategory::Plastic);
        assert_eq!(collections[0].quantity.as_deref(), Some("5 kg"));
        assert_eq!(collections[0].points, 50);
        assert_eq!(collections[0].material_id, Some(material_id));
    }

    #[tokio::test]
    async fn test_approve_twice_fails_without_reapplying() {
        let (store, producer, curator) = setup().await;
        let material_id = testing::insert_material(store.pool(), producer.id, "cans").await;

        store
            .approve_material(material_id, &curator, None, 50)
            .await
            .unwrap();

        let second = store.approve_material(material_id, &curator, None, 50).await;
        assert!(matches!(second, Err(Error::AlreadyReviewed)));

        // No double award, no second collection row.
        assert_eq!(user_points(&store, producer.id).await, 50);
        let collections = store.collections_by_producer(producer.id, 20).await.unwrap();
        assert_eq!(collections.len(), 1);
    }

    #[tokio::test]
    async fn test_reject_requires_feedback() {
        let (store, producer, curator) = setup().await;
        let material_id = testing::insert_material(store.pool(), producer.id, "scrap").await;

        let result = store.reject_material(material_id, &curator, "   ").await;
        assert!(matches!(result, Err(Error::FeedbackRequired)));

        // The material is untouched.
        let material = store.material_by_id(material_id).await.unwrap().unwrap();
        assert_eq!(material.status, MaterialStatus::Pending);
        assert!(material.curator_id.is_none());
        assert!(material.feedback.is_none());
    }

    #[tokio::test]
    async fn test_reject_then_approve_fails() {
        let (store, producer, curator) = setup().await;
        let material_id = testing::insert_material(store.pool(), producer.id, "foam").await;

        let rejected = store
            .reject_material(material_id, &curator, "mixed waste, cannot process")
            .await
            .unwrap();

        assert_eq!(rejected.material.status, MaterialStatus::Rejected);
        assert_eq!(rejected.material.points_granted, 0);

        let result = store.approve_material(material_id, &curator, None, 50).await;
        assert!(matches!(result, Err(Error::AlreadyReviewed)));

        // Rejection never pays out.
        assert_eq!(user_points(&store, producer.id).await, 0);
        assert!(store
            .collections_by_producer(producer.id, 20)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_review_missing_material() {
        let (store, _, curator) = setup().await;

        assert!(matches!(
            store.approve_material(424242, &curator, None, 50).await,
            Err(Error::NotFound("material"))
        ));
        assert!(matches!(
            store.reject_material(424242, &curator, "no such thing").await,
            Err(Error::NotFound("material"))
        ));
    }

    #[tokio::test]
    async fn test_negative_award_is_invalid() {
        let (store, producer, curator) = setup().await;
        let material_id = testing::insert_material(store.pool(), producer.id, "tins").await;

        let result = store.approve_material(material_id, &curator, None, -10).await;
        assert!(matches!(result, Err(Error::InvalidPoints)));

        let material = store.material_by_id(material_id).await.unwrap().unwrap();
        assert_eq!(material.status, MaterialStatus::Pending);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_pay_once() {
        let (store, producer, curator) = setup().await;
        let second_curator =
            testing::insert_user(store.pool(), "curator2", Role::Curator, UserStatus::Active, 0)
                .await;
        let material_id = testing::insert_material(store.pool(), producer.id, "e-waste").await;

        let (a, b) = tokio::join!(
            store.approve_material(material_id, &curator, None, 50),
            store.approve_material(material_id, &second_curator, None, 50),
        );

        // Exactly one reviewer wins; the other observes the conflict.
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(Error::AlreadyReviewed))));

        assert_eq!(user_points(&store, producer.id).await, 50);
        assert_eq!(
            store
                .collections_by_producer(producer.id, 20)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_approval_across_threshold_notifies_once_per_badge() {
        let (store, _, curator) = setup().await;
        let producer =
            testing::insert_user(store.pool(), "veteran", Role::Producer, UserStatus::Active, 80)
                .await;
        let material_id = testing::insert_material(store.pool(), producer.id, "paper").await;

        // 80 -> 130 crosses the 100-point badge only.
        store
            .approve_material(material_id, &curator, None, 50)
            .await
            .unwrap();

        let notifications = store.notifications_for(producer.id).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Achievement);
        assert_eq!(notifications[0].title, "Eco Warrior");
        assert!(!notifications[0].read);

        // A later approval below the next threshold stays quiet.
        let material_id = testing::insert_material(store.pool(), producer.id, "more paper").await;
        store
            .approve_material(material_id, &curator, None, 50)
            .await
            .unwrap();

        assert_eq!(store.notifications_for(producer.id).await.unwrap().len(), 1);
    }
}
