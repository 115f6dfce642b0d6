//! Configuration management for Confkeeper server
//!
//! Sources are layered in this order, later ones winning:
//! `conf/application.yml`, `CONFKEEPER_`-prefixed environment variables,
//! then command line flags.

use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use confkeeper_common::Whitelist;

use crate::startup::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const DEFAULT_COMPACTION_INTERVAL_SECS: u64 = 86400;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const CONFIG_TYPES_KEY: &str = "confkeeper.config_types";
const ACTION_TYPES_KEY: &str = "confkeeper.action_types";
const COMPACTION_INTERVAL_KEY: &str = "confkeeper.compaction.interval_secs";

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(name = "confkeeper-server")]
pub struct Cli {
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Seconds between compaction passes, 0 disables compaction
    #[arg(long = "compaction-interval")]
    pub compaction_interval: Option<u64>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Cli::parse())
    }

    pub fn load(args: Cli) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .add_source(File::with_name(&args.config_file).required(false))
            .add_source(
                Environment::with_prefix("CONFKEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key(CONFIG_TYPES_KEY)
                    .with_list_parse_key(ACTION_TYPES_KEY)
                    .try_parsing(true),
            );

        if let Some(v) = args.database_url {
            config_builder = config_builder.set_override("db.url", v)?;
        }
        if let Some(v) = args.compaction_interval {
            config_builder = config_builder.set_override(COMPACTION_INTERVAL_KEY, v)?;
        }

        Ok(Configuration {
            config: config_builder.build()?,
        })
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Store Configuration
    // ========================================================================

    /// Config type and grant action whitelists, defaults when unset
    pub fn whitelist(&self) -> Whitelist {
        let defaults = Whitelist::default();
        let config_types = self
            .config
            .get::<Vec<String>>(CONFIG_TYPES_KEY)
            .unwrap_or(defaults.config_types);
        let action_types = self
            .config
            .get::<Vec<String>>(ACTION_TYPES_KEY)
            .unwrap_or(defaults.action_types);

        Whitelist::new(config_types, action_types)
    }

    /// Period of the compaction task, `None` when disabled
    pub fn compaction_interval(&self) -> Option<Duration> {
        let secs = self
            .config
            .get_int(COMPACTION_INTERVAL_KEY)
            .map(|v| v.max(0) as u64)
            .unwrap_or(DEFAULT_COMPACTION_INTERVAL_SECS);

        (secs > 0).then(|| Duration::from_secs(secs))
    }

    pub fn admin_username(&self) -> String {
        self.config
            .get_string("confkeeper.admin.username")
            .unwrap_or(DEFAULT_ADMIN_USERNAME.to_string())
    }

    pub fn admin_password(&self) -> String {
        self.config
            .get_string("confkeeper.admin.password")
            .unwrap_or(DEFAULT_ADMIN_PASSWORD.to_string())
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string("logging.dir").ok(),
            self.config.get_bool("logging.console").unwrap_or(true),
            self.config.get_bool("logging.file").unwrap_or(false),
            self.config
                .get_string("logging.level")
                .unwrap_or("info".to_string()),
        )
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn database_url(&self) -> anyhow::Result<String> {
        Ok(self.config.get_string("db.url")?)
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let max_connections = self
            .config
            .get_int("db.pool.config.maximumPoolSize")
            .unwrap_or(20) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.config.minimumPoolSize")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.config.connectionTimeout")
            .unwrap_or(30) as u64;
        let acquire_timeout = self
            .config
            .get_int("db.pool.config.initializationFailTimeout")
            .unwrap_or(8) as u64;
        let idle_timeout = self
            .config
            .get_int("db.pool.config.idleTimeout")
            .unwrap_or(600) as u64;
        let max_lifetime = self
            .config
            .get_int("db.pool.config.maxLifetime")
            .unwrap_or(1800) as u64;
        let sqlx_logging = self
            .config
            .get_bool("db.pool.config.sqlxLogging")
            .unwrap_or(false);

        let url = self.database_url()?;

        // Every connection to an in-memory SQLite database is a separate database
        let max_connections = if url.contains(":memory:") {
            1
        } else {
            max_connections
        };

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            idle_timeout = idle_timeout,
            max_lifetime = max_lifetime,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }
}
