//! Process startup: logging, first-boot data, background tasks and shutdown.

mod init_data;
mod logging;
mod scheduler;
mod shutdown;

pub use init_data::init_data;
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use scheduler::start_compaction_task;
pub use shutdown::{ShutdownSignal, wait_for_shutdown};
