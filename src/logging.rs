use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Env var holding an EnvFilter directive, e.g. `wordsprint=debug`
pub const LOG_ENV: &str = "WORDSPRINT_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Keeps the background log writer alive. Drop it last to flush.
#[derive(Debug)]
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Send tracing output to `path`. The terminal belongs to the UI, so nothing
/// is ever written to stdout or stderr. Fails with `Error::Logging` if a
/// global subscriber is already installed.
pub fn init_file_logging(path: &Path) -> Result<LogGuard> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard { _guard: guard })
}
