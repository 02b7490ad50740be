//! SQLite record store for the Halodex catalog.
//!
//! This crate provides async CRUD for [`Character`](halodex_core::Character)
//! records plus lookups through the name, faction and species indexes,
//! using SQLx with SQLite.
//!
//! The [`Database`] handle has an explicit lifecycle: construct it, call
//! [`Database::initialize`] to open and seed the store, pass
//! [`Database::pool`] to the operations in [`character`], and
//! [`Database::close`] when done.
//!
//! # Example
//!
//! ```no_run
//! use database::{character, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut db = Database::new("sqlite:halodex.db?mode=rwc")?;
//!     db.initialize().await?;
//!
//!     for c in character::list_characters(db.pool()?).await? {
//!         println!("{} ({})", c.name, c.faction);
//!     }
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod error;
pub mod models;
pub mod seed;

pub use error::{DatabaseError, Result};
pub use models::CharacterRow;
pub use seed::seed_characters;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Record store handle.
///
/// Starts uninitialized; every operation needs [`Database::initialize`] to
/// have completed first and fails with [`DatabaseError::NotInitialized`]
/// otherwise.
#[derive(Debug)]
pub struct Database {
    url: String,
    options: SqliteConnectOptions,
    pool_size: u32,
    seed: bool,
    pool: Option<SqlitePool>,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 5;

    /// Create an uninitialized handle for a SQLite URL.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`,
    /// or `sqlite::memory:` for a throwaway store.
    pub fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DatabaseError::StorageUnavailable)?
            .create_if_missing(true)
            .foreign_keys(true);

        Ok(Self {
            url: url.to_string(),
            options,
            pool_size: Self::DEFAULT_POOL_SIZE,
            seed: true,
            pool: None,
        })
    }

    /// Use a custom pool size.
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Create the table empty instead of loading the built-in dataset.
    pub fn without_seed(mut self) -> Self {
        self.seed = false;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Whether `initialize()` has completed and the store is usable.
    pub fn is_open(&self) -> bool {
        self.pool.is_some()
    }

    /// Open the database, apply migrations and seed a freshly created table.
    ///
    /// Calling this on an already open handle is a no-op.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(30));

        // An in-memory database lives only while a connection is open.
        if self.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(self.options.clone())
            .await
            .map_err(DatabaseError::StorageUnavailable)?;

        info!(
            "Connected to database: {} (pool size: {})",
            self.url, self.pool_size
        );

        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations complete");

        seed::seed_once(&pool, self.seed).await?;

        self.pool = Some(pool);
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or(DatabaseError::NotInitialized)
    }

    /// Highest applied schema migration.
    pub async fn schema_version(&self) -> Result<i64> {
        let version = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1
            "#,
        )
        .fetch_one(self.pool()?)
        .await?;

        Ok(version.unwrap_or(0))
    }

    /// Close the connection pool. The handle returns to uninitialized.
    pub async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Closed database: {}", self.url);
        }
    }

    /// Destroy all stored records and start over with a fresh, seeded store.
    pub async fn reset(&mut self) -> Result<()> {
        if self.pool.is_none() {
            return Err(DatabaseError::NotInitialized);
        }

        self.close().await;

        if !self.is_in_memory() {
            remove_database_files(self.options.get_filename())?;
        }

        warn!("Database reset: {}", self.url);
        self.initialize().await
    }
}

/// Remove a database file and its WAL/shared-memory side files.
fn remove_database_files(path: &Path) -> Result<()> {
    let mut candidates = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        candidates.push(PathBuf::from(side));
    }

    for candidate in candidates {
        match std::fs::remove_file(&candidate) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(DatabaseError::Remove {
                    path: candidate,
                    source,
                })
            }
        }
    }

    Ok(())
}
