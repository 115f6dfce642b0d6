//! Periodic compaction of superseded config versions.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use confkeeper_config::service::compact;

/// Run [`compact`] every `period` until a shutdown notification arrives.
///
/// The first pass runs one full period after start. A failed pass is logged
/// and retried at the next tick.
pub fn start_compaction_task(
    db: DatabaseConnection,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = period.as_secs(), "compaction task started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match compact(&db).await {
                        Ok(report) => tracing::debug!(
                            keys = report.keys_compacted,
                            removed = report.records_removed,
                            "scheduled compaction completed"
                        ),
                        Err(e) => tracing::error!(
                            retryable = e.is_retryable(),
                            "scheduled compaction failed: {}",
                            e
                        ),
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("compaction task stopped");
                    break;
                }
            }
        }
    })
}
