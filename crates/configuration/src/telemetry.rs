use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global `tracing` subscriber.
///
/// Events go to a daily-rotated file under `settings.directory` rather than the
/// terminal, which belongs to the interactive menu. The returned guard flushes
/// the background writer when dropped, so keep it alive for the whole run.
pub fn init_logging(settings: &LoggingSettings) -> Result<WorkerGuard, ConfigError> {
    let filter = build_filter(settings)?;

    let appender = build_appender(settings)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}

/// Opens the daily-rotated log file, creating `settings.directory` if needed.
fn build_appender(settings: &LoggingSettings) -> Result<RollingFileAppender, ConfigError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(settings.file_prefix.as_str())
        .build(&settings.directory)
        .map_err(|e| {
            ConfigError::LoggingError(format!(
                "cannot write logs to '{}': {e}",
                settings.directory
            ))
        })
}

/// `RUST_LOG` wins; otherwise the configured directive is used.
fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter).map_err(|e| {
        ConfigError::LoggingError(format!("invalid filter '{}': {e}", settings.filter))
    })
}
