use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{logs_dir, LogConfig};

/// Sends tracing output to a daily log file under [`logs_dir`]; the terminal
/// belongs to the board. `RUST_LOG` overrides the configured level.
///
/// The returned guard flushes the writer on drop and must outlive the program.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let dir = logs_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("warning: logging disabled, could not create {}: {e}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::daily(&dir, "taskers.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
        )
        .try_init()
        .ok()?;
    Some(guard)
}
