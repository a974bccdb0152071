//! Zip extraction with POSIX permission restore.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::crosses_symlink;
use crate::manager::cancel::CancellationSignal;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::ProgressTracker;
use crate::manager::traits::ArchiveExtractor;

/// Central directory file header signature, `PK\x01\x02`.
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

/// Fixed part of a central directory file header.
const CENTRAL_HEADER_LEN: usize = 46;

/// Offset of the external file attributes inside that header.
const EXTERNAL_ATTRIBUTES_OFFSET: usize = 38;

/// Entry-by-entry zip extractor.
///
/// Entries are processed in central-directory order. Each file's Unix mode,
/// when the high 16 bits of its external attributes record one, is applied
/// after the file is written so that bundled executables stay executable.
/// Archives made on DOS/Windows carry no mode and keep the default
/// permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor.
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for ZipExtractor {
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

        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| failed(format!("cannot read zip directory: {}", e)))?;

        // Second handle for reading raw central directory headers.
        let mut raw = File::open(archive).map_err(|e| ManagerError::ReadFailed {
            path: archive.to_path_buf(),
            source: e,
        })?;

        let total_entries = zip.len();
        let mut files_extracted = 0usize;

        for index in 0..total_entries {
            cancel.checkpoint()?;

            let mut entry = zip
                .by_index(index)
                .map_err(|e| failed(format!("cannot read entry {}: {}", index, e)))?;

            let Some(relative) = entry.enclosed_name() else {
                debug!(entry = %entry.name(), "Skipping zip entry with unsafe path");
                progress.update_fraction(index as u64 + 1, total_entries as u64);
                continue;
            };
            if crosses_symlink(dest_dir, &relative) {
                warn!(entry = %entry.name(), "Skipping zip entry that goes through a symlink");
                progress.update_fraction(index as u64 + 1, total_entries as u64);
                continue;
            }
            let target = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| ManagerError::CreateDirFailed {
                    path: target.clone(),
                    source: e,
                })?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }

                let mut out = File::create(&target).map_err(|e| ManagerError::WriteFailed {
                    path: target.clone(),
                    source: e,
                })?;
                io::copy(&mut entry, &mut out)
                    .map_err(|e| failed(format!("cannot write {}: {}", target.display(), e)))?;
                drop(out);

                if let Some(mode) = stored_unix_mode(&mut raw, entry.central_header_start()) {
                    restore_permissions(&target, mode);
                }
                files_extracted += 1;
            }

            progress.update_fraction(index as u64 + 1, total_entries as u64);
        }

        progress.finish();

        info!(
            archive = %archive.display(),
            dest = %dest_dir.display(),
            entries = total_entries,
            files = files_extracted,
            "Zip extraction complete"
        );
        Ok(files_extracted)
    }
}

/// Unix mode recorded for the entry whose central header starts at `offset`.
///
/// `None` when the header cannot be read or its external attributes carry
/// no mode in their high 16 bits.
fn stored_unix_mode(raw: &mut File, offset: u64) -> Option<u32> {
    let mut header = [0u8; CENTRAL_HEADER_LEN];
    raw.seek(SeekFrom::Start(offset)).ok()?;
    raw.read_exact(&mut header).ok()?;
    unix_mode_from_central_header(&header)
}

fn unix_mode_from_central_header(header: &[u8]) -> Option<u32> {
    if header.len() < CENTRAL_HEADER_LEN || header[..4] != CENTRAL_HEADER_SIGNATURE {
        return None;
    }
    let at = EXTERNAL_ATTRIBUTES_OFFSET;
    let external = u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]);
    match external >> 16 {
        0 => None,
        mode => Some(mode),
    }
}

/// Apply a Unix mode to an extracted file, ignoring failures.
#[cfg(unix)]
fn restore_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)) {
        debug!(path = %path.display(), mode = format_args!("{:o}", mode), error = %e, "Could not restore permissions");
    }
}

#[cfg(not(unix))]
fn restore_permissions(_path: &Path, _mode: u32) {}
