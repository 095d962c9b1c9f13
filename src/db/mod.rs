//! Storage backends for hostels and bookings.
//!
//! SQLite is the durable default; the in-memory backend serves demos and tests.

mod memory;
mod repository;
mod sqlite;

pub use memory::MemoryRepository;
pub use repository::Repository;
pub use sqlite::SqliteRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::errors::AppError;

/// Build the repository selected by configuration.
pub async fn open_repository(config: &Config) -> Result<Arc<dyn Repository>, AppError> {
    let repo: Arc<dyn Repository> = match config.storage {
        StorageBackend::Sqlite => {
            let pool = init_database(&config.db_path).await?;
            Arc::new(SqliteRepository::new(pool))
        }
        StorageBackend::Memory => match &config.seed_path {
            Some(path) => Arc::new(MemoryRepository::from_seed_file(path).await?),
            None => Arc::new(MemoryRepository::new()),
        },
    };
    Ok(repo)
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hostels (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            hostel_type TEXT NOT NULL CHECK (hostel_type IN ('men', 'Women')),
            price REAL NOT NULL,
            total_seats INTEGER NOT NULL,
            seats_available INTEGER NOT NULL,
            seats_reserved INTEGER NOT NULL DEFAULT 0,
            amenities TEXT NOT NULL DEFAULT '[]',
            images TEXT NOT NULL DEFAULT '[]',
            location TEXT NOT NULL,
            verified INTEGER NOT NULL DEFAULT 0,
            contact_number TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    // No foreign key on hostel_id: bookings outlive their hostel
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            student_name TEXT NOT NULL,
            student_phone TEXT NOT NULL,
            hostel_id TEXT NOT NULL,
            hostel_name TEXT NOT NULL,
            joining_date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'confirmed', 'rejected')),
            timestamp TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_hostels_name ON hostels(name);
        CREATE INDEX IF NOT EXISTS idx_bookings_hostel_id ON bookings(hostel_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_bookings_timestamp ON bookings(timestamp);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests;
