//! Configuration module for the Hostel Finder backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Which storage backend serves the hostel and booking collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Durable SQLite file.
    Sqlite,
    /// Process-local maps, optionally seeded from a JSON file.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Some(StorageBackend::Sqlite),
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend selected at startup
    pub storage: StorageBackend,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// JSON array of hostels loaded into the memory backend
    pub seed_path: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let storage_raw = env::var("HOSTEL_STORAGE").unwrap_or_else(|_| "sqlite".to_string());
        let storage = StorageBackend::from_str(&storage_raw).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid HOSTEL_STORAGE '{}': expected sqlite or memory",
                storage_raw
            ))
        })?;

        let db_path = env::var("HOSTEL_DB_PATH")
            .unwrap_or_else(|_| "./data/hostels.sqlite".to_string())
            .into();

        let seed_path = env::var("HOSTEL_SEED_PATH").ok().map(PathBuf::from);

        let bind_raw =
            env::var("HOSTEL_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| {
            AppError::Validation(format!("Invalid HOSTEL_BIND_ADDR format: {}", bind_raw))
        })?;

        let log_level = env::var("HOSTEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            storage,
            db_path,
            seed_path,
            bind_addr,
            log_level,
        })
    }
}
