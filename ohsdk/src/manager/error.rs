//! Error types for the toolchain manager.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while installing or managing toolchain components.
///
/// Every variant renders a message that can be shown to an end user as-is.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to delete a file or directory.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to move an extracted tree into its install location.
    #[error("failed to move {} to {}: {reason}", from.display(), to.display())]
    RelocateFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The transfer failed at the network level.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// The operation was cancelled by the user.
    #[error("operation cancelled")]
    Cancelled,

    /// Downloaded file does not match its published digest.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// The checksum sidecar file holds no digest.
    #[error("checksum file {} does not contain a digest", path.display())]
    InvalidChecksumFile { path: PathBuf },

    /// Archive extraction failed.
    #[error("failed to extract {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// The extracted archive lacks the folder the installer relies on.
    #[error(
        "archive layout not recognised: expected folder {} after extraction",
        expected.display()
    )]
    MissingArchiveFolder { expected: PathBuf },

    /// No download URL is configured for this component on this platform.
    #[error("no download URL configured for {component} on {platform}")]
    NoDownloadUrl { component: String, platform: String },

    /// The requested SDK release is not known.
    #[error("unknown SDK release '{0}'")]
    UnknownRelease(String),

    /// The current OS or CPU architecture is not supported.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The component to remove or locate is not installed.
    #[error("{0} is not installed")]
    NotInstalled(String),
}

impl ManagerError {
    /// Whether this error is a user cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_http_status_display() {
        let err = ManagerError::HttpStatus {
            url: "https://example.com/sdk.tar.gz".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "download of https://example.com/sdk.tar.gz failed with HTTP status 404"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = ManagerError::ChecksumMismatch {
            filename: "sdk.tar.gz".to_string(),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("def456"));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ManagerError::Cancelled.is_cancelled());
        assert!(!ManagerError::Http("boom".to_string()).is_cancelled());
    }

    #[test]
    fn test_io_source_is_preserved() {
        let err = ManagerError::ReadFailed {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
    }
}
