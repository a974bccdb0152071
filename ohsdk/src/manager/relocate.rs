//! Move an extracted tree into its final install location.
//!
//! The previous install (if any) is renamed aside before the new tree is
//! moved in, and renamed back if the move fails. At every point one
//! complete tree exists at or beside the destination, and a successful
//! relocation never merges old and new contents.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::cancel::CancellationSignal;
use super::error::{ManagerError, ManagerResult};

/// Replace `dest` with the directory tree at `source`.
///
/// `source` is consumed: on success it no longer exists. Rename is tried
/// first; when that fails (typically across filesystems) the tree is copied
/// and the source left for workspace cleanup.
pub fn relocate(source: &Path, dest: &Path, cancel: &dyn CancellationSignal) -> ManagerResult<()> {
    cancel.checkpoint()?;

    if !source.is_dir() {
        return Err(ManagerError::MissingArchiveFolder {
            expected: source.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let backup = backup_path(dest);
    if backup.exists() {
        debug!(path = %backup.display(), "Removing stale relocation backup");
        remove_tree(&backup)?;
    }

    let had_previous = dest.exists();
    if had_previous {
        fs::rename(dest, &backup).map_err(|e| ManagerError::RelocateFailed {
            from: dest.to_path_buf(),
            to: backup.clone(),
            reason: e.to_string(),
        })?;
        debug!(dest = %dest.display(), backup = %backup.display(), "Moved previous install aside");
    }

    let moved = cancel
        .checkpoint()
        .and_then(|()| move_tree(source, dest, cancel));

    if let Err(e) = moved {
        if dest.exists() {
            if let Err(cleanup) = remove_tree(dest) {
                warn!(path = %dest.display(), error = %cleanup, "Failed to remove partial install");
            }
        }
        if had_previous {
            restore_backup(&backup, dest);
        }
        return Err(e);
    }

    if had_previous {
        if let Err(e) = remove_tree(&backup) {
            warn!(path = %backup.display(), error = %e, "Failed to remove previous install");
        }
    }

    info!(source = %source.display(), dest = %dest.display(), "Relocated install tree");
    Ok(())
}

/// Hidden sibling used to hold the previous install during a swap.
fn backup_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or(dest.as_os_str()));
    name.push(".ohsdk-backup");
    dest.with_file_name(name)
}

fn move_tree(source: &Path, dest: &Path, cancel: &dyn CancellationSignal) -> ManagerResult<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(error = %e, "Rename failed, copying tree instead");
            copy_dir_recursive(source, dest, cancel)
        }
    }
}

fn restore_backup(backup: &Path, dest: &Path) {
    match fs::rename(backup, dest) {
        Ok(()) => debug!(dest = %dest.display(), "Restored previous install"),
        Err(e) => warn!(
            backup = %backup.display(),
            dest = %dest.display(),
            error = %e,
            "Failed to restore previous install"
        ),
    }
}

fn remove_tree(path: &Path) -> ManagerResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ManagerError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Recursively copy a directory, checking for cancellation per entry.
///
/// Symlinks are recreated as links, never followed, so dangling or cyclic
/// links copy as-is.
fn copy_dir_recursive(
    source: &Path,
    dest: &Path,
    cancel: &dyn CancellationSignal,
) -> ManagerResult<()> {
    fs::create_dir_all(dest).map_err(|e| ManagerError::CreateDirFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let read_failed = |e: io::Error| ManagerError::ReadFailed {
        path: source.to_path_buf(),
        source: e,
    };

    for entry in fs::read_dir(source).map_err(read_failed)? {
        cancel.checkpoint()?;

        let entry = entry.map_err(read_failed)?;
        let file_type = entry.file_type().map_err(read_failed)?;
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if file_type.is_symlink() {
            copy_symlink(&source_path, &dest_path)?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&source_path, &dest_path, cancel)?;
        } else {
            fs::copy(&source_path, &dest_path).map_err(|e| ManagerError::WriteFailed {
                path: dest_path,
                source: e,
            })?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> ManagerResult<()> {
    let link_target = fs::read_link(source).map_err(|e| ManagerError::ReadFailed {
        path: source.to_path_buf(),
        source: e,
    })?;
    std::os::unix::fs::symlink(&link_target, dest).map_err(|e| ManagerError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Without portable symlink creation, links are skipped.
#[cfg(not(unix))]
fn copy_symlink(source: &Path, _dest: &Path) -> ManagerResult<()> {
    debug!(path = %source.display(), "Skipping symlink during copy");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::cancel::{CancelToken, NeverCancel};
    use tempfile::TempDir;

    fn make_tree(root: &Path, files: &[(&str, &str)]) {
        for (name, contents) in files {
            let path = root.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
    }

    #[test]
    fn test_relocate_into_empty_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extract/linux");
        make_tree(&source, &[("toolchains/hdc", "hdc")]);

        let dest = temp.path().join("sdk/linux/12");
        relocate(&source, &dest, &NeverCancel).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(dest.join("toolchains/hdc")).unwrap(), "hdc");
    }

    #[test]
    fn test_relocate_replaces_without_merging() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("sdk/linux/12");
        make_tree(&dest, &[("old-only.txt", "old"), ("shared.txt", "old")]);

        let source = temp.path().join("extract/linux");
        make_tree(&source, &[("shared.txt", "new"), ("new-only.txt", "new")]);

        relocate(&source, &dest, &NeverCancel).unwrap();

        assert_eq!(fs::read_to_string(dest.join("shared.txt")).unwrap(), "new");
        assert!(dest.join("new-only.txt").exists());
        assert!(!dest.join("old-only.txt").exists());
        assert!(!backup_path(&dest).exists());
    }

    #[test]
    fn test_relocate_twice_leaves_single_tree() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("tools");

        for round in ["first", "second"] {
            let source = temp.path().join(format!("extract-{}", round));
            make_tree(&source, &[("bin/ohpm", round)]);
            relocate(&source, &dest, &NeverCancel).unwrap();
        }

        assert_eq!(fs::read_to_string(dest.join("bin/ohpm")).unwrap(), "second");
        let siblings: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(siblings, vec!["tools".to_string()]);
    }

    #[test]
    fn test_missing_source_keeps_previous_install() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("emulator");
        make_tree(&dest, &[("images/system.img", "img")]);

        let result = relocate(&temp.path().join("absent"), &dest, &NeverCancel);

        assert!(matches!(result, Err(ManagerError::MissingArchiveFolder { .. })));
        assert!(dest.join("images/system.img").exists());
    }

    #[test]
    fn test_cancelled_relocation_keeps_previous_install() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("tools");
        make_tree(&dest, &[("bin/ohpm", "old")]);
        let source = temp.path().join("extract");
        make_tree(&source, &[("bin/ohpm", "new")]);

        let token = CancelToken::new();
        token.cancel();
        let result = relocate(&source, &dest, &token);

        assert!(matches!(result, Err(ManagerError::Cancelled)));
        assert_eq!(fs::read_to_string(dest.join("bin/ohpm")).unwrap(), "old");
        assert!(source.exists());
    }

    #[test]
    fn test_stale_backup_is_replaced() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("tools");
        make_tree(&dest, &[("bin/ohpm", "old")]);
        make_tree(&backup_path(&dest), &[("stale.txt", "stale")]);
        let source = temp.path().join("extract");
        make_tree(&source, &[("bin/ohpm", "new")]);

        relocate(&source, &dest, &NeverCancel).unwrap();

        assert_eq!(fs::read_to_string(dest.join("bin/ohpm")).unwrap(), "new");
        assert!(!backup_path(&dest).exists());
    }

    #[test]
    fn test_backup_path_is_hidden_sibling() {
        let backup = backup_path(Path::new("/opt/sdk/linux/12"));
        assert_eq!(backup, PathBuf::from("/opt/sdk/linux/.12.ohsdk-backup"));
    }

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        make_tree(&source, &[("file1.txt", "hello"), ("subdir/file2.txt", "world")]);

        let dest = temp.path().join("copied");
        copy_dir_recursive(&source, &dest, &NeverCancel).unwrap();

        assert_eq!(fs::read_to_string(dest.join("file1.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(dest.join("subdir/file2.txt")).unwrap(), "world");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_recursive_keeps_symlinks() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        make_tree(&source, &[("lib/libfoo.so.1", "elf")]);
        symlink("libfoo.so.1", source.join("lib/libfoo.so")).unwrap();
        symlink("missing-target", source.join("dangling")).unwrap();
        symlink("..", source.join("lib/parent")).unwrap();

        let dest = temp.path().join("dest");
        copy_dir_recursive(&source, &dest, &NeverCancel).unwrap();

        let lib_link = dest.join("lib/libfoo.so");
        assert!(fs::symlink_metadata(&lib_link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&lib_link).unwrap(), PathBuf::from("libfoo.so.1"));
        assert_eq!(fs::read_to_string(&lib_link).unwrap(), "elf");

        let dangling = dest.join("dangling");
        assert!(fs::symlink_metadata(&dangling).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&dangling).unwrap(), PathBuf::from("missing-target"));

        assert_eq!(fs::read_link(dest.join("lib/parent")).unwrap(), PathBuf::from(".."));
    }
}
