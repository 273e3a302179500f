//! File logging.
//!
//! The login form owns the terminal, so log output goes to
//! `<home>/logs/doorman.log` instead of stderr.

use std::fs;

use anyhow::{Context, Result, anyhow};
use doorman_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter directive variable, e.g. `DOORMAN_LOG=doorman_core=debug`.
pub const LOG_ENV: &str = "DOORMAN_LOG";
const DEFAULT_FILTER: &str = "warn";
const LOG_FILE: &str = "doorman.log";

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &dir, LOG_FILE,
    ));
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("Failed to install log subscriber")?;

    Ok(guard)
}
