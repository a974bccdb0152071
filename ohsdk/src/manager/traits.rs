//! Seams between the install orchestrators and their collaborators.
//!
//! The orchestrators only talk to downloads and archives through these
//! traits, so tests can substitute file-backed downloaders or fake
//! extractors without a network.

use std::path::{Path, PathBuf};

use super::cancel::CancellationSignal;
use super::error::ManagerResult;
use super::progress::ProgressTracker;

/// Fetches a remote file to a local path.
pub trait PackageDownloader {
    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// Implementations report local progress through `progress` and must
    /// call [`ProgressTracker::finish`] on success. On cancellation they
    /// remove the partial `dest` and return
    /// [`ManagerError::Cancelled`](super::ManagerError::Cancelled).
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<u64>;
}

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor {
    /// Extract `archive` into `dest_dir`, returning the number of files written.
    ///
    /// `progress` is finished on success, including for empty archives.
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<usize>;
}

/// Asks the user for a pre-downloaded archive when no download URL exists.
pub trait ArchivePicker {
    /// Return the chosen archive, or `None` if the user declined.
    fn pick_archive(&self, component: &str) -> Option<PathBuf>;
}

/// Picker that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoArchivePicker;

impl ArchivePicker for NoArchivePicker {
    fn pick_archive(&self, _component: &str) -> Option<PathBuf> {
        None
    }
}
