//! Install orchestrators.
//!
//! Each installer runs one linear workflow on the calling thread:
//!
//! 1. Download the archive (and, for SDKs, its checksum sidecar)
//! 2. Verify the checksum (SDKs only)
//! 3. Extract into a temp workspace
//! 4. Extract nested component zips (SDKs only)
//! 5. Relocate the extracted folder to the install path
//! 6. Remove the workspace
//!
//! Every step owns a fixed slice of the 0..=100 progress range and closes
//! it on success, so a successful run reports increments summing to
//! exactly 100. The caller's cancellation signal is checked between steps
//! and inside every download/extract loop; the workspace is removed on
//! every exit path.

mod emulator;
mod sdk;
mod tools;

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

pub use emulator::EmulatorInstaller;
pub use sdk::SdkInstaller;
pub use tools::ToolsInstaller;

use super::cancel::CancellationSignal;
use super::error::{ManagerError, ManagerResult};
use super::progress::{ProgressBudget, ProgressSink, ProgressTracker};
use super::relocate::relocate;
use super::target::{InstallKind, InstallTarget};
use super::traits::{ArchiveExtractor, PackageDownloader};
use super::workspace::TempWorkspace;

/// Result of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// What was installed.
    pub kind: InstallKind,
    /// Final location of the installed tree.
    pub install_path: PathBuf,
    /// Total bytes downloaded (zero for local archives).
    pub bytes_downloaded: u64,
    /// Number of files extracted, nested component archives included.
    pub files_extracted: usize,
}

/// Step budgets of a single-zip workflow.
#[derive(Debug, Clone, Copy)]
struct ZipBudgets {
    download: ProgressBudget,
    extract: ProgressBudget,
    relocate: ProgressBudget,
}

const DOWNLOADED_ZIP: ZipBudgets = ZipBudgets {
    download: ProgressBudget::new(0, 60),
    extract: ProgressBudget::new(60, 35),
    relocate: ProgressBudget::new(95, 5),
};

const LOCAL_ZIP: ZipBudgets = ZipBudgets {
    download: ProgressBudget::new(0, 0),
    extract: ProgressBudget::new(0, 90),
    relocate: ProgressBudget::new(90, 10),
};

/// Where the archive of a zip workflow comes from.
enum ArchiveSource<'a> {
    Remote(&'a str),
    Local(&'a Path),
}

/// Shared tail of the tools and emulator workflows.
///
/// `after_relocate` runs on the installed tree before the final progress
/// increment.
fn run_zip_workflow<D: PackageDownloader>(
    downloader: &D,
    staging_dir: &Path,
    target: &InstallTarget,
    source: ArchiveSource<'_>,
    sink: &dyn ProgressSink,
    cancel: &dyn CancellationSignal,
    after_relocate: impl FnOnce(&Path) -> ManagerResult<()>,
) -> ManagerResult<InstallResult> {
    cancel.checkpoint()?;

    let workspace = TempWorkspace::create(staging_dir, target.workspace_prefix())?;
    let (archive, bytes_downloaded, budgets) = match source {
        ArchiveSource::Remote(url) => {
            let archive = workspace.path().join(&target.archive_name);
            let mut progress = ProgressTracker::new(
                sink,
                DOWNLOADED_ZIP.download,
                format!("Downloading {}", target.kind),
            );
            let bytes = downloader.download(url, &archive, &mut progress, cancel)?;
            (archive, bytes, DOWNLOADED_ZIP)
        }
        ArchiveSource::Local(path) => {
            if !path.is_file() {
                return Err(ManagerError::ReadFailed {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "archive not found"),
                });
            }
            (path.to_path_buf(), 0, LOCAL_ZIP)
        }
    };

    let extract_root = workspace.path().join("extract");
    let mut progress = ProgressTracker::new(
        sink,
        budgets.extract,
        format!("Extracting {}", target.kind),
    );
    let files_extracted = target
        .extract
        .extract(&archive, &extract_root, &mut progress, cancel)?;

    let mut progress =
        ProgressTracker::new(sink, budgets.relocate, format!("Installing {}", target.kind));
    relocate_extracted(target, &extract_root, cancel)?;
    after_relocate(&target.install_path)?;
    progress.finish();

    info!(
        kind = %target.kind,
        path = %target.install_path.display(),
        bytes = bytes_downloaded,
        files = files_extracted,
        "Install complete"
    );

    Ok(InstallResult {
        kind: target.kind,
        install_path: target.install_path.clone(),
        bytes_downloaded,
        files_extracted,
    })
}

/// Move `<extract_root>/<relocate_from>` to the target's install path.
fn relocate_extracted(
    target: &InstallTarget,
    extract_root: &Path,
    cancel: &dyn CancellationSignal,
) -> ManagerResult<()> {
    let source = extract_root.join(&target.relocate_from);
    if !source.is_dir() {
        return Err(ManagerError::MissingArchiveFolder { expected: source });
    }
    relocate(&source, &target.install_path, cancel)
}
