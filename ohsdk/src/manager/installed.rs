//! Listing and removing installed trees.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::config::ManagerConfig;
use super::error::{ManagerError, ManagerResult};
use crate::platform::Platform;

/// Directory holding installed API levels for `platform`.
pub fn sdk_os_dir(config: &ManagerConfig, platform: Platform) -> PathBuf {
    config.sdk_root.join(platform.os.folder_name())
}

/// Install directory of one API level.
pub fn sdk_api_dir(config: &ManagerConfig, platform: Platform, api_level: u32) -> PathBuf {
    sdk_os_dir(config, platform).join(api_level.to_string())
}

/// Installed SDK API levels, ascending.
///
/// Only numeric directory names count; relocation backups and stray files
/// are ignored. A missing SDK root means nothing is installed.
pub fn installed_sdk_levels(config: &ManagerConfig, platform: Platform) -> ManagerResult<Vec<u32>> {
    let dir = sdk_os_dir(config, platform);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ManagerError::ReadFailed {
                path: dir,
                source: e,
            })
        }
    };

    let mut levels: Vec<u32> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect();
    levels.sort_unstable();
    Ok(levels)
}

/// Remove one installed API level.
pub fn remove_sdk(config: &ManagerConfig, platform: Platform, api_level: u32) -> ManagerResult<()> {
    remove_installed(
        &sdk_api_dir(config, platform, api_level),
        &format!("SDK API {}", api_level),
    )
}

/// Remove the command-line tools.
pub fn remove_tools(config: &ManagerConfig) -> ManagerResult<()> {
    remove_installed(&config.tools_dir, "command-line tools")
}

/// Remove the emulator.
pub fn remove_emulator(config: &ManagerConfig) -> ManagerResult<()> {
    remove_installed(&config.emulator_dir, "emulator")
}

fn remove_installed(path: &Path, what: &str) -> ManagerResult<()> {
    if !path.is_dir() {
        return Err(ManagerError::NotInstalled(what.to_string()));
    }
    fs::remove_dir_all(path).map_err(|e| ManagerError::RemoveFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "Removed {}", what);
    Ok(())
}
