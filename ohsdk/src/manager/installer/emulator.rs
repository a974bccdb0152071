//! Emulator installer.

use std::fs;
use std::path::Path;

use tracing::info;

use super::{run_zip_workflow, ArchiveSource, InstallResult};
use crate::manager::cancel::CancellationSignal;
use crate::manager::config::ManagerConfig;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::ProgressSink;
use crate::manager::target::InstallTarget;
use crate::manager::traits::PackageDownloader;
use crate::platform::Platform;

/// Folder under the emulator root holding system images.
pub const IMAGES_DIR: &str = "images";

/// Installs the emulator and prepares its `images/` folder.
#[derive(Debug)]
pub struct EmulatorInstaller<D: PackageDownloader> {
    config: ManagerConfig,
    platform: Platform,
    downloader: D,
}

impl<D: PackageDownloader> EmulatorInstaller<D> {
    pub fn new(config: ManagerConfig, platform: Platform, downloader: D) -> Self {
        Self {
            config,
            platform,
            downloader,
        }
    }

    /// Install target under this installer's configuration.
    pub fn target(&self) -> InstallTarget {
        InstallTarget::emulator(&self.config, self.platform)
    }

    /// Download and install the emulator.
    ///
    /// Unlike the tools installer there is no manual fallback: a missing URL
    /// is [`ManagerError::NoDownloadUrl`].
    pub fn install(
        &self,
        sink: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<InstallResult> {
        let target = self.target();
        let url = target
            .url
            .as_deref()
            .ok_or_else(|| ManagerError::NoDownloadUrl {
                component: target.kind.to_string(),
                platform: self.platform.to_string(),
            })?;

        info!(url = %url, "Installing emulator");
        run_zip_workflow(
            &self.downloader,
            &self.config.staging_dir,
            &target,
            ArchiveSource::Remote(url),
            sink,
            cancel,
            ensure_images_dir,
        )
    }
}

fn ensure_images_dir(install_path: &Path) -> ManagerResult<()> {
    let images = install_path.join(IMAGES_DIR);
    fs::create_dir_all(&images).map_err(|e| ManagerError::CreateDirFailed {
        path: images,
        source: e,
    })
}
