//! Database pool, schema, and catalog seeds.
//!
//! The schema is created idempotently at daemon startup; the achievement
//! catalog is inserted once on an empty table. Every timestamp is written
//! from the application so the column format stays uniform.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::Result;

/// Open a connection pool against the given SQLite URL.
///
/// Creates the database file on first run and keeps foreign keys enforced
/// on every connection.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create tables and seed the achievement catalog.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    create_tables(pool).await?;
    ensure_catalog(pool).await?;

    info!("database ready");
    Ok(())
}

async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            first_name      TEXT,
            last_name       TEXT,
            role            INTEGER NOT NULL CHECK (role IN (1, 2, 3)),
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('active', 'inactive', 'pending')),
            points          INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
            created_at      TEXT NOT NULL,
            last_active_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS materials (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            category        TEXT NOT NULL,
            description     TEXT NOT NULL,
            location        TEXT NOT NULL,
            quantity        TEXT,
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'approved', 'rejected')),
            feedback        TEXT,
            points_granted  INTEGER NOT NULL DEFAULT 0,
            producer_id     INTEGER NOT NULL REFERENCES users (id),
            curator_id      INTEGER REFERENCES users (id),
            created_at      TEXT NOT NULL,
            reviewed_at     TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            material_name  TEXT NOT NULL,
            category       TEXT NOT NULL,
            quantity       TEXT,
            points         INTEGER NOT NULL DEFAULT 0,
            feedback       TEXT,
            producer_id    INTEGER NOT NULL REFERENCES users (id),
            material_id    INTEGER REFERENCES materials (id),
            collected_at   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS achievements (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            name             TEXT NOT NULL,
            description      TEXT,
            icon             TEXT NOT NULL,
            points_required  INTEGER NOT NULL DEFAULT 0,
            position         INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS spaces (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            kind        TEXT NOT NULL CHECK (kind IN ('collection', 'event', 'course')),
            address     TEXT NOT NULL,
            hours       TEXT,
            description TEXT,
            active      INTEGER NOT NULL DEFAULT 1,
            latitude    REAL,
            longitude   REAL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            description TEXT,
            kind        TEXT NOT NULL
                        CHECK (kind IN ('collection', 'event', 'course', 'workshop')),
            status      TEXT NOT NULL DEFAULT 'scheduled'
                        CHECK (status IN ('scheduled', 'ongoing', 'completed', 'cancelled')),
            starts_at   TEXT NOT NULL,
            time        TEXT,
            space_id    INTEGER REFERENCES spaces (id),
            location    TEXT,
            created_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users (id),
            kind        TEXT NOT NULL CHECK (kind IN ('info', 'achievement', 'reminder')),
            title       TEXT NOT NULL,
            message     TEXT NOT NULL,
            read        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the achievement catalog if the table is empty.
async fn ensure_catalog(pool: &SqlitePool) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM achievements")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(());
    }

    let catalog = [
        ("First Collection", "Completed your first collection", "🌱", 0i64, 1i64),
        ("Eco Warrior", "Reached 100 points", "⚡", 100, 2),
        ("Green Guardian", "Reached 500 points", "🌳", 500, 3),
        ("Recycling Master", "Reached 1000 points", "👑", 1000, 4),
    ];

    for (name, description, icon, points_required, position) in catalog {
        sqlx::query(
            "INSERT INTO achievements (name, description, icon, points_required, position)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(points_required)
        .bind(position)
        .execute(pool)
        .await?;
    }

    info!(count = catalog.len(), "achievement catalog seeded");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for database-backed tests.

    use chrono::Utc;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use crate::models::{MaterialCategory, Role, User, UserStatus};

    /// In-memory database with schema and catalog in place.
    ///
    /// Single connection: an in-memory SQLite database is per-connection,
    /// and serializing on one connection keeps tests deterministic.
    pub async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        super::init_database(&pool).await.expect("schema");
        pool
    }

    /// Insert a user and return the stored row.
    pub async fn insert_user(
        pool: &SqlitePool,
        username: &str,
        role: Role,
        status: UserStatus,
        points: i64,
    ) -> User {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users
                 (username, email, first_name, last_name, role, status, points,
                  created_at, last_active_at)
             VALUES (?, ?, NULL, NULL, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(role)
        .bind(status)
        .bind(points)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert user");

        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(pool)
            .await
            .expect("fetch user")
    }

    /// Insert a pending material for the given producer and return its id.
    pub async fn insert_material(pool: &SqlitePool, producer_id: i64, name: &str) -> i64 {
        let result = sqlx::query(
            "INSERT INTO materials
                 (name, category, description, location, quantity, status,
                  points_granted, producer_id, created_at)
             VALUES (?, ?, 'test material', 'warehouse 3', '5 kg', 'pending', 0, ?, ?)",
        )
        .bind(name)
        .bind(MaterialCategory::Plastic)
        .bind(producer_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("insert material");

        result.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reciclo.db");
        let url = format!("sqlite:{}", path.display());

        let pool = connect(&url).await.unwrap();
        init_database(&pool).await.unwrap();
        assert!(path.exists());
        pool.close().await;

        // Reopening finds the existing schema and catalog.
        let pool = connect(&url).await.unwrap();
        init_database(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM achievements")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = testing::pool().await;

        // Second run must neither fail nor duplicate the catalog.
        init_database(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM achievements")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_catalog_is_ordered_by_position() {
        let pool = testing::pool().await;

        let thresholds: Vec<i64> =
            sqlx::query_scalar("SELECT points_required FROM achievements ORDER BY position")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert_eq!(thresholds, [0, 100, 500, 1000]);
    }
}
