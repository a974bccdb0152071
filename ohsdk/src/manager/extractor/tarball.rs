//! Gzip'd tar extraction with leading-component stripping.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::{debug, info, warn};

use super::{crosses_symlink, sanitize_entry_path};
use crate::manager::cancel::CancellationSignal;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::ProgressTracker;
use crate::manager::traits::ArchiveExtractor;

/// Streaming `.tar.gz` extractor.
///
/// Release tarballs nest their payload at different depths depending on the
/// OS variant, so each entry has `strip_components` leading path components
/// removed before it is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarExtractor {
    strip_components: usize,
}

impl TarExtractor {
    /// Create an extractor that strips `strip_components` leading components.
    pub fn new(strip_components: usize) -> Self {
        Self { strip_components }
    }
}

impl ArchiveExtractor for TarExtractor {
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<usize> {
        cancel.checkpoint()?;

        fs::create_dir_all(dest_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let file = File::open(archive).map_err(|e| ManagerError::ReadFailed {
            path: archive.to_path_buf(),
            source: e,
        })?;

        let failed = |reason: String| ManagerError::ExtractionFailed {
            path: archive.to_path_buf(),
            reason,
        };

        let mut tarball = Archive::new(GzDecoder::new(BufReader::new(file)));
        tarball.set_preserve_permissions(true);
        tarball.set_overwrite(true);

        let entries = tarball
            .entries()
            .map_err(|e| failed(format!("cannot read tar stream: {}", e)))?;

        let mut files_extracted = 0usize;

        for entry in entries {
            cancel.checkpoint()?;

            let mut entry = entry.map_err(|e| failed(format!("corrupt tar entry: {}", e)))?;
            let entry_path = entry
                .path()
                .map_err(|e| failed(format!("invalid entry path: {}", e)))?
                .into_owned();

            let Some(relative) = sanitize_entry_path(&entry_path, self.strip_components) else {
                debug!(entry = %entry_path.display(), "Skipping tar entry");
                continue;
            };

            // Hard link names are archive paths that would resolve against
            // the working directory, unstripped.
            if entry.header().entry_type() == EntryType::Link {
                debug!(entry = %entry_path.display(), "Skipping hard link entry");
                continue;
            }

            if crosses_symlink(dest_dir, &relative) {
                warn!(entry = %entry_path.display(), "Skipping tar entry that goes through a symlink");
                continue;
            }

            let target = dest_dir.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            entry
                .unpack(&target)
                .map_err(|e| failed(format!("cannot write {}: {}", relative.display(), e)))?;

            if entry.header().entry_type().is_file() {
                files_extracted += 1;
            }
        }

        progress.finish();

        info!(
            archive = %archive.display(),
            dest = %dest_dir.display(),
            files = files_extracted,
            strip = self.strip_components,
            "Tar extraction complete"
        );
        Ok(files_extracted)
    }
}
