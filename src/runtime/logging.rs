use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_log_path};

/// Install the global subscriber, writing to the log file since the terminal
/// belongs to the TUI. `RUST_LOG` takes precedence over `logging.level`.
///
/// Returns `None` when no log file can be opened; the app runs without logs.
/// Keep the guard alive for the whole session so buffered lines get flushed.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let path = settings.file.clone().or_else(default_log_path)?;
    let dir = path.parent()?;
    let file_name = path.file_name()?;

    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("ipfs-radio: cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .ok()?;

    Some(guard)
}
