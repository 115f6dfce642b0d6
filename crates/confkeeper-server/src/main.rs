//! Main entry point for the Confkeeper server.

use confkeeper_migration::{Migrator, MigratorTrait};
use confkeeper_server::{model::Configuration, startup};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::new()?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let db = configuration.database_connection().await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    startup::init_data(&db, &configuration).await?;

    let whitelist = configuration.whitelist();
    info!(
        config_types = ?whitelist.config_types,
        action_types = ?whitelist.action_types,
        "Confkeeper store ready"
    );

    let shutdown = startup::ShutdownSignal::new();
    let compaction_handle = match configuration.compaction_interval() {
        Some(period) => Some(startup::start_compaction_task(
            db.clone(),
            period,
            shutdown.subscribe(),
        )),
        None => {
            info!("Scheduled compaction disabled");
            None
        }
    };

    startup::wait_for_shutdown().await;
    shutdown.shutdown();

    if let Some(handle) = compaction_handle
        && let Err(e) = handle.await
    {
        tracing::error!("Compaction task terminated abnormally: {}", e);
    }

    db.close().await?;
    info!("Shutdown complete");

    Ok(())
}
