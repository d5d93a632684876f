use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type FileLayer<S> = fmt::Layer<S, DefaultFields, Format, NonBlocking>;

/// Initialize tracing with file-based logging
/// Logs are written to ~/.config/banger/logs/banger-YYYY-MM-DD-HH-MM-SS.log
///
/// Buffered lines are written out when the returned guard drops, so hold it
/// until the command has finished.
pub fn init_logging() -> Result<(WorkerGuard, PathBuf)> {
    let logs_dir = dirs::config_dir()
        .ok_or(anyhow::anyhow!("Could not find config directory"))?
        .join("banger")
        .join("logs");
    std::fs::create_dir_all(&logs_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_filename = format!("banger-{}.log", timestamp);
    let (file_layer, guard) = file_layer(&logs_dir, &log_filename);

    // Default to INFO, can be overridden with RUST_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    Ok((guard, logs_dir.join(log_filename)))
}

fn file_layer<S>(logs_dir: &Path, log_filename: &str) -> (FileLayer<S>, WorkerGuard) {
    // Non-blocking so command output never waits on the log file
    let file_appender = tracing_appender::rolling::never(logs_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    (layer, guard)
}
