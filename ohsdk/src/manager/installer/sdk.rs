//! SDK release installer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{relocate_extracted, InstallResult};
use crate::manager::cancel::CancellationSignal;
use crate::manager::config::ManagerConfig;
use crate::manager::download::verify_sidecar;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::extractor::ZipExtractor;
use crate::manager::progress::{ProgressBudget, ProgressSink, ProgressTracker};
use crate::manager::target::{InstallTarget, SdkRelease};
use crate::manager::traits::{ArchiveExtractor, PackageDownloader};
use crate::manager::workspace::TempWorkspace;
use crate::platform::Platform;

const DOWNLOAD_ARCHIVE: ProgressBudget = ProgressBudget::new(0, 50);
const DOWNLOAD_CHECKSUM: ProgressBudget = ProgressBudget::new(50, 1);
const VERIFY_CHECKSUM: ProgressBudget = ProgressBudget::new(51, 4);
const EXTRACT_PRIMARY: ProgressBudget = ProgressBudget::new(55, 10);
const EXTRACT_COMPONENTS: ProgressBudget = ProgressBudget::new(65, 30);
const RELOCATE: ProgressBudget = ProgressBudget::new(95, 5);

/// Installs one SDK API level under `<sdk_root>/<os>/<api>`.
///
/// The release tarball contains one folder per OS, each holding a zip per
/// SDK component (`ets`, `js`, `native`, `toolchains`, ...). Only the
/// current OS folder is kept: its component zips are unpacked in place and
/// the folder becomes the API level directory.
#[derive(Debug)]
pub struct SdkInstaller<D: PackageDownloader> {
    config: ManagerConfig,
    platform: Platform,
    downloader: D,
}

impl<D: PackageDownloader> SdkInstaller<D> {
    pub fn new(config: ManagerConfig, platform: Platform, downloader: D) -> Self {
        Self {
            config,
            platform,
            downloader,
        }
    }

    /// Install target for `release` under this installer's configuration.
    pub fn target(&self, release: SdkRelease) -> InstallTarget {
        InstallTarget::sdk(&self.config, self.platform, release)
    }

    /// Download, verify, extract and install `release`.
    pub fn install(
        &self,
        release: SdkRelease,
        sink: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<InstallResult> {
        let target = self.target(release);
        let (Some(url), Some(sidecar_url)) =
            (target.url.as_deref(), target.checksum_url.as_deref())
        else {
            return Err(ManagerError::NoDownloadUrl {
                component: target.kind.to_string(),
                platform: self.platform.to_string(),
            });
        };

        info!(release = %release, platform = %self.platform, "Installing SDK");
        cancel.checkpoint()?;

        let workspace =
            TempWorkspace::create(&self.config.staging_dir, target.workspace_prefix())?;
        let archive = workspace.path().join(&target.archive_name);
        let sidecar = workspace
            .path()
            .join(format!("{}.sha256", target.archive_name));

        let mut progress = ProgressTracker::new(
            sink,
            DOWNLOAD_ARCHIVE,
            format!("Downloading SDK {}", release.version),
        );
        let bytes_downloaded = self.downloader.download(url, &archive, &mut progress, cancel)?;

        let mut progress = ProgressTracker::new(sink, DOWNLOAD_CHECKSUM, "Downloading checksum");
        self.downloader
            .download(sidecar_url, &sidecar, &mut progress, cancel)?;

        cancel.checkpoint()?;
        let mut progress = ProgressTracker::new(sink, VERIFY_CHECKSUM, "Verifying checksum");
        verify_sidecar(&archive, &sidecar)?;
        progress.finish();

        let extract_root = workspace.path().join("extract");
        let mut progress = ProgressTracker::new(sink, EXTRACT_PRIMARY, "Extracting SDK archive");
        let mut files_extracted = target
            .extract
            .extract(&archive, &extract_root, &mut progress, cancel)?;

        // Free the space of the tarball before unpacking components.
        remove_file_logged(&archive);

        let os_dir = extract_root.join(&target.relocate_from);
        if !os_dir.is_dir() {
            return Err(ManagerError::MissingArchiveFolder { expected: os_dir });
        }
        files_extracted += extract_components(&os_dir, sink, cancel)?;

        let mut progress = ProgressTracker::new(sink, RELOCATE, "Installing SDK");
        relocate_extracted(&target, &extract_root, cancel)?;
        progress.finish();

        info!(
            release = %release,
            path = %target.install_path.display(),
            bytes = bytes_downloaded,
            files = files_extracted,
            "SDK installed"
        );

        Ok(InstallResult {
            kind: target.kind,
            install_path: target.install_path,
            bytes_downloaded,
            files_extracted,
        })
    }
}

/// Unpack every `*.zip` directly inside `os_dir` into `os_dir`, deleting each.
///
/// The components budget is closed even when there are no zips.
fn extract_components(
    os_dir: &Path,
    sink: &dyn ProgressSink,
    cancel: &dyn CancellationSignal,
) -> ManagerResult<usize> {
    let components = component_archives(os_dir)?;
    let budgets = EXTRACT_COMPONENTS.split(components.len());
    let extractor = ZipExtractor::new();
    let mut files = 0;

    for (zip, budget) in components.iter().zip(budgets) {
        let name = zip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(component = %name, "Extracting SDK component");

        let mut progress = ProgressTracker::new(sink, budget, format!("Extracting {}", name));
        files += extractor.extract(zip, os_dir, &mut progress, cancel)?;
        fs::remove_file(zip).map_err(|e| ManagerError::RemoveFailed {
            path: zip.clone(),
            source: e,
        })?;
    }

    if components.is_empty() {
        ProgressTracker::new(sink, EXTRACT_COMPONENTS, "Extracting SDK components").finish();
    }

    Ok(files)
}

/// Component archives in `dir`, sorted by file name.
fn component_archives(dir: &Path) -> ManagerResult<Vec<PathBuf>> {
    let read_failed = |e: io::Error| ManagerError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut zips = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let path = entry.map_err(read_failed)?.path();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip && path.is_file() {
            zips.push(path);
        }
    }
    zips.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(zips)
}

fn remove_file_logged(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "Could not remove archive");
    }
}
