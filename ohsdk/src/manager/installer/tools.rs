//! Command-line tools installer.

use std::path::Path;

use tracing::info;

use super::{run_zip_workflow, ArchiveSource, InstallResult};
use crate::manager::cancel::CancellationSignal;
use crate::manager::config::ManagerConfig;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::ProgressSink;
use crate::manager::target::InstallTarget;
use crate::manager::traits::{ArchivePicker, PackageDownloader};
use crate::platform::Platform;

/// Installs the command-line tools bundle (`ohpm`, signing and build tools).
///
/// The bundle is not mirrored for every platform. Without a configured URL
/// the caller is asked for an archive it downloaded by hand.
#[derive(Debug)]
pub struct ToolsInstaller<D: PackageDownloader> {
    config: ManagerConfig,
    platform: Platform,
    downloader: D,
}

impl<D: PackageDownloader> ToolsInstaller<D> {
    pub fn new(config: ManagerConfig, platform: Platform, downloader: D) -> Self {
        Self {
            config,
            platform,
            downloader,
        }
    }

    /// Install target under this installer's configuration.
    pub fn target(&self) -> InstallTarget {
        InstallTarget::command_line_tools(&self.config, self.platform)
    }

    /// Download and install the bundle, falling back to `picker`.
    ///
    /// A picker that declines ends the run as [`ManagerError::Cancelled`].
    pub fn install(
        &self,
        picker: &dyn ArchivePicker,
        sink: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<InstallResult> {
        let target = self.target();

        match target.url.as_deref() {
            Some(url) => {
                info!(url = %url, "Installing command-line tools");
                run_zip_workflow(
                    &self.downloader,
                    &self.config.staging_dir,
                    &target,
                    ArchiveSource::Remote(url),
                    sink,
                    cancel,
                    |_| Ok(()),
                )
            }
            None => {
                info!(platform = %self.platform, "No tools URL configured, asking for an archive");
                let archive = picker
                    .pick_archive(&target.kind.to_string())
                    .ok_or(ManagerError::Cancelled)?;
                self.install_from_archive(&archive, sink, cancel)
            }
        }
    }

    /// Install from an archive already on disk.
    pub fn install_from_archive(
        &self,
        archive: &Path,
        sink: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<InstallResult> {
        let target = self.target();
        info!(archive = %archive.display(), "Installing command-line tools from local archive");
        run_zip_workflow(
            &self.downloader,
            &self.config.staging_dir,
            &target,
            ArchiveSource::Local(archive),
            sink,
            cancel,
            |_| Ok(()),
        )
    }
}
