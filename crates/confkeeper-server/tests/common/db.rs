//! Database test utilities
//!
//! Tests run against `TEST_DATABASE_URL` when it is set (MySQL or
//! PostgreSQL), otherwise against a private in-memory SQLite database.
//! Tests that race writers use [`TestDatabase::concurrent`], which falls back
//! to a SQLite file so the pool can hold several connections.

use std::env;
use std::path::Path;
use std::time::Duration;

use confkeeper_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tempfile::TempDir;

const SQLITE_MEMORY_URL: &str = "sqlite::memory:";
const SQLITE_FILE_CONNECTIONS: u32 = 8;

#[derive(Clone, Debug)]
pub struct TestDatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl TestDatabaseConfig {
    pub fn from_env() -> Option<Self> {
        env::var("TEST_DATABASE_URL").ok().map(|url| Self {
            url,
            max_connections: 10,
        })
    }

    /// Every connection to `sqlite::memory:` opens a separate database, so the
    /// pool is pinned to exactly one connection
    pub fn sqlite_memory() -> Self {
        Self {
            url: SQLITE_MEMORY_URL.to_string(),
            max_connections: 1,
        }
    }

    /// A database file shared by a pool of connections
    pub fn sqlite_file(path: &Path) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections: SQLITE_FILE_CONNECTIONS,
        }
    }
}

pub struct TestDatabase {
    pub connection: DatabaseConnection,
    config: TestDatabaseConfig,
    // keeps the SQLite file alive for the lifetime of the pool
    _dir: Option<TempDir>,
}

impl TestDatabase {
    /// Connect and bring the schema up to date
    pub async fn connect(config: TestDatabaseConfig) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(false);

        let connection = Database::connect(opt).await?;
        Migrator::up(&connection, None).await?;

        Ok(Self {
            connection,
            config,
            _dir: None,
        })
    }

    pub async fn new() -> Self {
        let config = TestDatabaseConfig::from_env().unwrap_or_else(TestDatabaseConfig::sqlite_memory);
        Self::connect(config)
            .await
            .expect("failed to prepare test database")
    }

    /// A database whose pool really runs transactions side by side
    pub async fn concurrent() -> Self {
        if let Some(config) = TestDatabaseConfig::from_env() {
            return Self::connect(config)
                .await
                .expect("failed to prepare test database");
        }

        let dir = tempfile::tempdir().expect("failed to create database dir");
        let config = TestDatabaseConfig::sqlite_file(&dir.path().join("confkeeper.db"));
        let mut test_db = Self::connect(config)
            .await
            .expect("failed to prepare test database");
        test_db._dir = Some(dir);
        test_db
    }

    pub fn max_connections(&self) -> u32 {
        self.config.max_connections
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn is_sqlite(&self) -> bool {
        self.config.url.starts_with("sqlite")
    }
}
