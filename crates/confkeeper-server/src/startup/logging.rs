//! File-based logging with per-component log files.
//!
//! Every component writes to the root log and, additionally, to its own
//! rolling file selected by `tracing` target:
//!
//! | Log File           | Component                        | Target Prefixes                                  |
//! |--------------------|----------------------------------|--------------------------------------------------|
//! | confkeeper.log     | Root logger (all components)     | (all)                                            |
//! | config-server.log  | Config store and compaction      | confkeeper_config, confkeeper_server::startup::scheduler |
//! | core-auth.log      | Users, roles and access checks   | confkeeper_auth                                  |
//! | persistence.log    | Database schema and locking      | confkeeper_persistence, confkeeper_migration     |
//!
//! Log files are stored in `~/confkeeper/logs` by default.
//! Override with `CONFKEEPER_LOG_DIR` or the `logging.dir` config key.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::{Filter, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const ROOT_LOG_FILE: &str = "confkeeper.log";

struct ComponentLogDef {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "config-server.log",
        targets: &["confkeeper_config", "confkeeper_server::startup::scheduler"],
    },
    ComponentLogDef {
        file_name: "core-auth.log",
        targets: &["confkeeper_auth"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &["confkeeper_persistence", "confkeeper_migration"],
    },
];

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/confkeeper/logs", home))
}

/// Log rotation policy
#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub console_level: Level,
    pub file_logging: bool,
    pub file_level: Level,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            console_level: Level::INFO,
            file_logging: false,
            file_level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from application configuration.
    ///
    /// `CONFKEEPER_LOG_DIR` wins over the configured directory.
    pub fn from_config(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: String,
    ) -> Self {
        let log_dir = std::env::var("CONFKEEPER_LOG_DIR")
            .ok()
            .or(log_dir)
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        let level = level.parse().unwrap_or(Level::INFO);

        Self {
            log_dir,
            console_output,
            console_level: level,
            file_logging,
            file_level: level,
            rotation: LogRotation::Daily,
        }
    }
}

/// Keeps the non-blocking file writers alive; dropping it flushes them.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Plain-text layer for one rolling file; `filter` picks what reaches it
fn file_layer<F>(config: &LoggingConfig, file_name: &str, filter: F) -> (BoxedLayer, WorkerGuard)
where
    F: Filter<Registry> + Send + Sync + 'static,
{
    let appender = RollingFileAppender::new(config.rotation.into(), &config.log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_thread_names(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(filter)
        .boxed();
    (layer, guard)
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Initialize the global subscriber with console and file layers.
///
/// `RUST_LOG` overrides the configured level for the console and root file.
/// Component files capture every event from their targets.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console_output {
        layers.push(
            fmt::layer()
                .with_thread_names(true)
                .with_line_number(true)
                .with_filter(level_filter(config.console_level))
                .boxed(),
        );
    }

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;

        let files = std::iter::once(file_layer(
            config,
            ROOT_LOG_FILE,
            level_filter(config.file_level),
        ))
        .chain(COMPONENT_LOGS.iter().map(|component| {
            let targets = component
                .targets
                .iter()
                .fold(Targets::new(), |t, target| t.with_target(*target, LevelFilter::TRACE));
            file_layer(config, component.file_name, targets)
        }));
        for (layer, guard) in files {
            layers.push(layer);
            guards.push(guard);
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            component_files = COMPONENT_LOGS.len(),
            "File logging initialized"
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.console_output);
        assert!(!config.file_logging);
        assert_eq!(config.console_level, Level::INFO);
        assert!(config.log_dir.ends_with("confkeeper/logs"));
    }

    #[test]
    fn test_logging_config_from_config() {
        let config = LoggingConfig::from_config(
            Some("/tmp/test-logs".to_string()),
            false,
            true,
            "debug".to_string(),
        );
        if std::env::var("CONFKEEPER_LOG_DIR").is_err() {
            assert_eq!(config.log_dir, PathBuf::from("/tmp/test-logs"));
        }
        assert!(!config.console_output);
        assert!(config.file_logging);
        assert_eq!(config.file_level, Level::DEBUG);
    }

    #[test]
    fn test_unparsable_level_falls_back_to_info() {
        let config = LoggingConfig::from_config(None, true, false, "loud".to_string());
        assert_eq!(config.console_level, Level::INFO);
    }

    #[test]
    fn test_log_rotation_conversion() {
        assert!(matches!(Rotation::from(LogRotation::Daily), Rotation::DAILY));
        assert!(matches!(Rotation::from(LogRotation::Hourly), Rotation::HOURLY));
        assert!(matches!(Rotation::from(LogRotation::Never), Rotation::NEVER));
    }

    #[test]
    fn test_init_file_logging() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().join("logs"),
            console_output: false,
            file_logging: true,
            ..LoggingConfig::default()
        };

        let guard = init_logging(&config).unwrap();
        tracing::info!(target: "confkeeper_config", "written to the component file");
        drop(guard);

        let files: Vec<String> = std::fs::read_dir(&config.log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(files.iter().any(|f| f.starts_with(ROOT_LOG_FILE)));
        for component in COMPONENT_LOGS {
            assert!(files.iter().any(|f| f.starts_with(component.file_name)));
        }

        // the global subscriber can only be installed once
        assert!(init_logging(&LoggingConfig::default()).is_err());
    }

    #[test]
    fn test_component_targets_are_crate_paths() {
        for component in COMPONENT_LOGS {
            assert!(component.file_name.ends_with(".log"));
            assert_ne!(component.file_name, ROOT_LOG_FILE);
            assert!(
                component
                    .targets
                    .iter()
                    .all(|t| t.starts_with("confkeeper_"))
            );
        }
    }
}
