//! Demo data for the `seed` subcommand.
//!
//! Inserts one account per role, a couple of registrations waiting for
//! approval, and a handful of spaces and events, so a fresh instance has
//! something on every dashboard. Skipped entirely once any user exists.

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::{EventKind, Role, SpaceKind, UserStatus};
use crate::store::{NewEvent, NewSpace, Store};

/// Populate an empty database with demo users, spaces, and events.
pub async fn seed_demo_data(store: &Store) -> Result<()> {
    if store.count_users().await? > 0 {
        info!("database already has users, skipping demo data");
        return Ok(());
    }

    insert_demo_user(store, "admin", "System", "Admin", Role::Admin, UserStatus::Active, 0).await?;
    insert_demo_user(store, "curator", "Casey", "Rivera", Role::Curator, UserStatus::Active, 0)
        .await?;
    insert_demo_user(store, "producer", "Pat", "Moreno", Role::Producer, UserStatus::Active, 370)
        .await?;

    // Registrations for the admin approval queue.
    insert_demo_user(store, "joao", "João", "Silva", Role::Producer, UserStatus::Pending, 0)
        .await?;
    insert_demo_user(store, "maria", "Maria", "Santos", Role::Producer, UserStatus::Pending, 0)
        .await?;

    let spaces = [
        NewSpace {
            name: "EcoPoint Center".to_string(),
            kind: SpaceKind::Collection,
            address: "123 Flower Street, Downtown".to_string(),
            hours: Some("Mon-Fri: 8am-6pm".to_string()),
            description: Some("Main drop-off point".to_string()),
            latitude: None,
            longitude: None,
        },
        NewSpace {
            name: "Riverside Depot".to_string(),
            kind: SpaceKind::Collection,
            address: "45 Harbor Road".to_string(),
            hours: Some("Sat: 9am-1pm".to_string()),
            description: None,
            latitude: None,
            longitude: None,
        },
        NewSpace {
            name: "Community Hall".to_string(),
            kind: SpaceKind::Event,
            address: "9 Market Square".to_string(),
            hours: None,
            description: Some("Venue for workshops and courses".to_string()),
            latitude: None,
            longitude: None,
        },
    ];

    let mut hall_id = None;
    for space in spaces {
        let is_hall = space.name == "Community Hall";
        let created = store.create_space(space).await?;
        if is_hall {
            hall_id = Some(created.id);
        }
    }

    let now = Utc::now();
    let events = [
        NewEvent {
            title: "Neighborhood Cleanup".to_string(),
            kind: EventKind::Collection,
            description: Some("Bring gloves and bags".to_string()),
            starts_at: now + Duration::hours(2),
            time: Some("14:00 - 17:00".to_string()),
            space_id: None,
            location: Some("Central Park entrance".to_string()),
        },
        NewEvent {
            title: "Composting Workshop".to_string(),
            kind: EventKind::Workshop,
            description: Some("Home composting basics".to_string()),
            starts_at: now + Duration::days(3),
            time: Some("10:00 - 12:00".to_string()),
            space_id: hall_id,
            location: None,
        },
        NewEvent {
            title: "Recycling 101".to_string(),
            kind: EventKind::Course,
            description: None,
            starts_at: now + Duration::days(10),
            time: Some("19:00 - 21:00".to_string()),
            space_id: hall_id,
            location: None,
        },
    ];

    for event in events {
        store.create_event(event).await?;
    }

    info!("demo data seeded");
    Ok(())
}

async fn insert_demo_user(
    store: &Store,
    username: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
    status: UserStatus,
    points: i64,
) -> Result<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users
             (username, email, first_name, last_name, role, status, points,
              created_at, last_active_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(format!("{username}@reciclo.example"))
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .bind(status)
    .bind(points)
    .bind(now)
    .bind(now)
    .execute(store.pool())
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn test_seed_is_guarded() {
        let store = Store::new(testing::pool().await);

        seed_demo_data(&store).await.unwrap();
        let after_first = store.count_users().await.unwrap();
        assert_eq!(after_first, 5);

        // Running again must not duplicate anything.
        seed_demo_data(&store).await.unwrap();
        assert_eq!(store.count_users().await.unwrap(), after_first);

        assert_eq!(store.count_users_by_status(UserStatus::Pending).await.unwrap(), 2);
        assert_eq!(store.count_spaces().await.unwrap(), 3);
        assert_eq!(store.count_open_events().await.unwrap(), 3);
    }
}
