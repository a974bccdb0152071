//! Per-run scratch directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, warn};

use super::error::{ManagerError, ManagerResult};

/// Process-unique scratch directory removed when dropped.
///
/// Every install run downloads and extracts inside one of these, so the
/// staging area is cleaned up on success, failure and cancellation alike.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: Option<TempDir>,
}

impl TempWorkspace {
    /// Create a workspace under `staging_dir` whose name starts with `prefix`.
    pub fn create(staging_dir: &Path, prefix: &str) -> ManagerResult<Self> {
        fs::create_dir_all(staging_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: staging_dir.to_path_buf(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(staging_dir)
            .map_err(|e| ManagerError::CreateDirFailed {
                path: staging_dir.to_path_buf(),
                source: e,
            })?;

        debug!(path = %dir.path().display(), "Created temp workspace");
        Ok(Self { dir: Some(dir) })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!(path = %path.display(), "Removed temp workspace"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp workspace"),
        }
    }
}
