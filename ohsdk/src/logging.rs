//! Tracing subscriber setup.
//!
//! Everything at the configured level goes to `ohsdk.log` in the log
//! directory through a non-blocking writer; warnings and errors are also
//! echoed to stderr. `RUST_LOG` overrides the file filter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub use tracing_appender::non_blocking::WorkerGuard;

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "ohsdk.log";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    InitFailed(String),
}

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "ohsdk=debug,ohsdk_cli=debug"
    } else {
        "ohsdk=info,ohsdk_cli=info"
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the background log writer.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|e| LoggingError::CreateDirFailed {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The local offset is unavailable on some multi-threaded Unix setups.
    let timer = OffsetTime::local_rfc_3339()
        .unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::InitFailed(e.to_string()))?;

    tracing::debug!(dir = %log_dir.display(), verbose, "Logging initialized");
    Ok(guard)
}
