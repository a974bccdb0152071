//! CLI error type.

use std::fmt;

use ohsdk::config::ConfigFileError;
use ohsdk::logging::LoggingError;
use ohsdk::manager::ManagerError;

/// Exit status for a run the user cancelled.
pub const EXIT_CANCELLED: i32 = 130;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Install pipeline or lookup failure.
    Manager(ManagerError),
    /// Reading or writing `config.ini` failed.
    ConfigFile(ConfigFileError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// Invalid argument or configuration value.
    Config(String),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Manager(e) if e.is_cancelled() => EXIT_CANCELLED,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Manager(e) => write!(f, "{}", e),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Config(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Manager(e) => Some(e),
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) => None,
        }
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        CliError::Manager(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_exit_code() {
        assert_eq!(CliError::from(ManagerError::Cancelled).exit_code(), EXIT_CANCELLED);
        assert_eq!(
            CliError::from(ManagerError::UnknownRelease("9.9".to_string())).exit_code(),
            1
        );
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_display_passes_message_through() {
        let err = CliError::from(ManagerError::NotInstalled("emulator".to_string()));
        assert_eq!(err.to_string(), "emulator is not installed");
    }
}
