//! Streaming HTTP(S) downloader with progress and cancellation.
//!
//! Responses are streamed to disk through a fixed-size buffer; the whole
//! archive is never held in memory. Redirects are followed by the HTTP
//! client (up to its default limit of 10 hops).

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{debug, info, warn};

use crate::manager::cancel::CancellationSignal;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::ProgressTracker;
use crate::manager::traits::PackageDownloader;

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("ohsdk/", env!("CARGO_PKG_VERSION"));

/// HTTP-based archive downloader.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    /// Create a new HTTP downloader with default settings.
    pub fn new() -> ManagerResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP downloader with custom timeout.
    pub fn with_timeout(timeout: Duration) -> ManagerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ManagerError::Http(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Create the destination file and any missing parent directories.
    fn prepare_destination(&self, dest: &Path) -> ManagerResult<File> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        File::create(dest).map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })
    }

    /// Issue the GET request and reject non-success statuses.
    fn send_request(&self, url: &str) -> ManagerResult<Response> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ManagerError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                ManagerError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Stream the response body to the destination file.
    fn stream_download(
        &self,
        url: &str,
        mut response: Response,
        file: File,
        dest: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<u64> {
        let total_size = response.content_length().filter(|&len| len > 0);
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        loop {
            if cancel.is_cancelled() {
                drop(response);
                drop(writer);
                discard_partial(dest);
                info!(url = %url, bytes = downloaded, "Download cancelled");
                return Err(ManagerError::Cancelled);
            }

            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| self.read_error(url, e))?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| ManagerError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;

            if let Some(total) = total_size {
                progress.update_fraction(downloaded, total);
            }
        }

        writer.flush().map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }

    fn read_error(&self, url: &str, error: io::Error) -> ManagerError {
        if error.kind() == io::ErrorKind::TimedOut {
            ManagerError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("read error: {}", error),
            }
        }
    }
}

impl PackageDownloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<u64> {
        cancel.checkpoint()?;

        info!(url = %url, dest = %dest.display(), "Starting download");
        let file = self.prepare_destination(dest)?;

        let response = match self.send_request(url) {
            Ok(response) => response,
            Err(e @ ManagerError::HttpStatus { .. }) => {
                drop(file);
                discard_partial(dest);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let bytes = self.stream_download(url, response, file, dest, progress, cancel)?;
        progress.finish();

        info!(url = %url, bytes, "Download complete");
        Ok(bytes)
    }
}

/// Remove a partially written download, logging rather than failing.
fn discard_partial(dest: &Path) {
    match fs::remove_file(dest) {
        Ok(()) => debug!(path = %dest.display(), "Removed partial download"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %dest.display(), error = %e, "Failed to remove partial download"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::cancel::CancelToken;
    use crate::manager::progress::{NoProgress, ProgressBudget};
    use tempfile::TempDir;

    #[test]
    fn test_http_downloader_default_timeout() {
        let downloader = HttpDownloader::new().unwrap();
        assert_eq!(downloader.timeout.as_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_http_downloader_with_timeout() {
        let downloader = HttpDownloader::with_timeout(Duration::from_secs(60)).unwrap();
        assert_eq!(downloader.timeout.as_secs(), 60);
    }

    #[test]
    fn test_cancelled_before_start_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("archive.tar.gz");
        let downloader = HttpDownloader::new().unwrap();
        let token = CancelToken::new();
        token.cancel();

        let mut progress = ProgressTracker::new(&NoProgress, ProgressBudget::FULL, "Downloading");
        let result = downloader.download("http://127.0.0.1:9/never", &dest, &mut progress, &token);

        assert!(matches!(result, Err(ManagerError::Cancelled)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_discard_partial_missing_file_is_silent() {
        let temp = TempDir::new().unwrap();
        discard_partial(&temp.path().join("missing.bin"));
    }
}
