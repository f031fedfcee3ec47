//! Tracing subscriber setup for the gateway binary.

use std::path::Path;

use clarity_core::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix for the daily-rotated log file.
pub const LOG_FILE_NAME: &str = "clarity-agent.log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {dir}: {source}")]
    LogDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to initialize tracing: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
pub fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_level()))
}

/// Install the global subscriber: stdout always, plus a daily file when enabled.
///
/// The returned guard flushes the file writer and must live until shutdown.
pub fn init_tracing(settings: &Settings) -> Result<Option<WorkerGuard>, LoggingError> {
    let (file_layer, guard) = if settings.logging.file_enabled {
        let dir = Path::new(&settings.logging.file_dir);
        std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
            dir: settings.logging.file_dir.clone(),
            source,
        })?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
