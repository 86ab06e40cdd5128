//! Tracing setup. The terminal belongs to the TUI, so events go to a daily
//! rolling file instead of stdout.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file prefix inside the log directory.
const LOG_FILE_NAME: &str = "customer-profiles.log";

/// Install the global subscriber. Reads the level from `RUST_LOG` and falls
/// back to `customer_profiles=info`. Keep the returned guard alive for the
/// whole run or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("customer_profiles=info"));

    // A subscriber may already be installed (tests); that is not fatal.
    let _ = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .try_init();

    Ok(guard)
}
