//! Log setup.
//!
//! Logs go to a daily-rolling file under `<config_dir>/logs/` so they never
//! interleave with the REPL output. `RUST_LOG` overrides the `info` default.

use anyhow::{Context, Result};
use tomodachi_infrastructure::{ServiceType, TomodachiPaths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "tomodachi.log";

/// Installs the global subscriber. Keep the guard alive until exit.
pub fn init(paths: &TomodachiPaths) -> Result<WorkerGuard> {
    let log_dir = paths.get_path(ServiceType::Logs)?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
