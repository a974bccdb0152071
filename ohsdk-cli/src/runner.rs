//! Shared setup for commands that touch installed trees.
//!
//! Loads `config.ini`, installs logging and resolves the host platform once,
//! so each command body only deals with its own work.

use ohsdk::config::ConfigFile;
use ohsdk::logging::{init_logging, WorkerGuard};
use ohsdk::manager::{CancelToken, HttpDownloader, ManagerConfig};
use ohsdk::platform::Platform;
use tracing::{info, warn};

use crate::error::CliError;

/// Command context: configuration, platform and the live log writer.
pub struct CliRunner {
    config: ManagerConfig,
    platform: Platform,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    /// Load configuration and initialize logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let file = ConfigFile::load()?;
        let log_guard = init_logging(&file.logging.dir, verbose)?;
        let platform = Platform::current()?;

        Ok(Self {
            config: ManagerConfig::from_config_file(&file),
            platform,
            _log_guard: log_guard,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = ohsdk::VERSION,
            command,
            platform = %self.platform,
            sdk_root = %self.config.sdk_root.display(),
            "ohsdk starting"
        );
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// HTTP downloader using the configured timeout.
    pub fn downloader(&self) -> Result<HttpDownloader, CliError> {
        Ok(HttpDownloader::with_timeout(self.config.timeout)?)
    }

    /// Token cancelled by Ctrl+C.
    ///
    /// The handler can only be installed once per process; a second call
    /// returns a token that is never cancelled by the signal.
    pub fn cancel_on_ctrlc(&self) -> CancelToken {
        let token = CancelToken::new();
        let trigger = token.clone();

        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Cancelling, cleaning up...");
            trigger.cancel();
        }) {
            warn!(error = %e, "Failed to set Ctrl+C handler");
        }

        token
    }
}
