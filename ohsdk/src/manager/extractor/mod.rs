//! Archive extraction for toolchain installs.
//!
//! Two engines share the [`ArchiveExtractor`] contract:
//! - [`TarExtractor`] for gzip'd tarballs (SDK releases), with leading path
//!   components stripped per entry
//! - [`ZipExtractor`] for zip files (SDK components, command-line tools,
//!   emulator), restoring POSIX permission bits
//!
//! [`ExtractStrategy`] selects one of them from an install target.

mod tarball;
mod zipfile;

use std::fs;
use std::path::{Component, Path, PathBuf};

pub use tarball::TarExtractor;
pub use zipfile::ZipExtractor;

use super::cancel::CancellationSignal;
use super::error::ManagerResult;
use super::progress::ProgressTracker;
use super::traits::ArchiveExtractor;

/// How an install target's archive is unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// Gzip'd tarball with `strip_components` leading path parts removed.
    Tar { strip_components: usize },
    /// Zip archive extracted as-is.
    Zip,
}

impl ArchiveExtractor for ExtractStrategy {
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<usize> {
        match *self {
            Self::Tar { strip_components } => {
                TarExtractor::new(strip_components).extract(archive, dest_dir, progress, cancel)
            }
            Self::Zip => ZipExtractor::new().extract(archive, dest_dir, progress, cancel),
        }
    }
}

/// Reduce an archive entry path to a safe relative path.
///
/// Drops the first `strip` components, then rejects anything that could
/// escape the destination (`..`, absolute roots, drive prefixes). Returns
/// `None` when nothing is left to write.
pub(crate) fn sanitize_entry_path(path: &Path, strip: usize) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in path.components().skip(strip) {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// Whether writing `relative` under `dest_dir` would go through a symlink.
///
/// Every existing component of the joined path is checked without following
/// links; an earlier archive entry may have planted a link pointing outside
/// `dest_dir`.
pub(crate) fn crosses_symlink(dest_dir: &Path, relative: &Path) -> bool {
    let mut current = dest_dir.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_without_strip() {
        assert_eq!(
            sanitize_entry_path(Path::new("ohos-sdk/linux/ets.zip"), 0),
            Some(PathBuf::from("ohos-sdk/linux/ets.zip"))
        );
    }

    #[test]
    fn test_sanitize_strips_leading_components() {
        assert_eq!(
            sanitize_entry_path(Path::new("ohos-sdk/linux/ets.zip"), 1),
            Some(PathBuf::from("linux/ets.zip"))
        );
        assert_eq!(
            sanitize_entry_path(Path::new("a/b/c/darwin/ets.zip"), 3),
            Some(PathBuf::from("darwin/ets.zip"))
        );
    }

    #[test]
    fn test_sanitize_leading_dot_counts_as_component() {
        assert_eq!(
            sanitize_entry_path(Path::new("./ohos-sdk/linux"), 1),
            Some(PathBuf::from("ohos-sdk/linux"))
        );
    }

    #[test]
    fn test_sanitize_fully_stripped_is_none() {
        assert_eq!(sanitize_entry_path(Path::new("ohos-sdk/"), 1), None);
        assert_eq!(sanitize_entry_path(Path::new("a/b"), 3), None);
    }

    #[test]
    fn test_sanitize_rejects_escapes() {
        assert_eq!(sanitize_entry_path(Path::new("../evil"), 0), None);
        assert_eq!(sanitize_entry_path(Path::new("ok/../../evil"), 0), None);
        assert_eq!(sanitize_entry_path(Path::new("/etc/passwd"), 0), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_crosses_symlink() {
        let temp = tempfile::TempDir::new().unwrap();
        let dest = temp.path().join("out");
        fs::create_dir_all(dest.join("linux/ets")).unwrap();
        std::os::unix::fs::symlink(temp.path(), dest.join("linux/escape")).unwrap();

        assert!(!crosses_symlink(&dest, Path::new("linux/ets/api.d.ts")));
        assert!(!crosses_symlink(&dest, Path::new("linux/new/dir/file")));
        assert!(crosses_symlink(&dest, Path::new("linux/escape/pwned")));
        assert!(crosses_symlink(&dest, Path::new("linux/escape")));
    }
}
