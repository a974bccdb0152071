//! What gets installed where: release table, remote naming and layout.

use std::fmt;
use std::path::PathBuf;

use super::config::ManagerConfig;
use super::error::{ManagerError, ManagerResult};
use super::extractor::ExtractStrategy;
use crate::platform::{Arch, Os, Platform};

/// A published SDK release and the API level it ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdkRelease {
    pub version: &'static str,
    pub api_level: u32,
}

/// Known SDK releases, oldest first.
pub const SDK_RELEASES: &[SdkRelease] = &[
    SdkRelease { version: "4.0", api_level: 10 },
    SdkRelease { version: "4.1", api_level: 11 },
    SdkRelease { version: "5.0.0", api_level: 12 },
    SdkRelease { version: "5.0.1", api_level: 13 },
    SdkRelease { version: "5.0.2", api_level: 14 },
    SdkRelease { version: "5.0.3", api_level: 15 },
    SdkRelease { version: "5.1.0", api_level: 18 },
    SdkRelease { version: "6.0", api_level: 20 },
];

/// Releases whose Linux/Windows tarball has no wrapping folder.
const UNWRAPPED_RELEASES: &[&str] = &["5.0.0", "5.0.1", "6.0"];

impl SdkRelease {
    /// Find a release by version string (`5.0.0`) or API level (`12`).
    pub fn find(query: &str) -> ManagerResult<SdkRelease> {
        let query = query.trim();
        let by_version = SDK_RELEASES.iter().find(|r| r.version == query);
        let by_api = || {
            query
                .parse::<u32>()
                .ok()
                .and_then(|api| SDK_RELEASES.iter().find(|r| r.api_level == api))
        };

        by_version
            .or_else(by_api)
            .copied()
            .ok_or_else(|| ManagerError::UnknownRelease(query.to_string()))
    }

    /// Release shipping `api_level`, if known.
    pub fn for_api(api_level: u32) -> Option<SdkRelease> {
        SDK_RELEASES.iter().find(|r| r.api_level == api_level).copied()
    }
}

impl fmt::Display for SdkRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (API {})", self.version, self.api_level)
    }
}

/// Name of the SDK archive published for `platform`.
pub fn sdk_archive_filename(platform: Platform) -> &'static str {
    match (platform.os, platform.arch) {
        (Os::Darwin, Arch::Arm64) => "L2-SDK-MAC-M1-PUBLIC.tar.gz",
        (Os::Darwin, Arch::X64) => "ohos-sdk-mac-public.tar.gz",
        (Os::Linux | Os::Windows, _) => "ohos-sdk-windows_linux-public.tar.gz",
    }
}

/// `{base}/{version}-Release/{filename}`.
pub fn sdk_archive_url(base_url: &str, version: &str, platform: Platform) -> String {
    format!(
        "{}/{}-Release/{}",
        base_url.trim_end_matches('/'),
        version,
        sdk_archive_filename(platform)
    )
}

/// Checksum sidecar published next to an archive.
pub fn checksum_url(archive_url: &str) -> String {
    format!("{}.sha256", archive_url)
}

/// Leading path components to strip from the SDK tarball.
pub fn strip_components(version: &str, os: Os) -> usize {
    match os {
        Os::Darwin => 3,
        Os::Linux | Os::Windows if UNWRAPPED_RELEASES.contains(&version) => 0,
        Os::Linux | Os::Windows => 1,
    }
}

/// Which kind of tree an install produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Sdk { api_level: u32 },
    CommandLineTools,
    Emulator,
}

impl fmt::Display for InstallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallKind::Sdk { api_level } => write!(f, "SDK API {}", api_level),
            InstallKind::CommandLineTools => f.write_str("command-line tools"),
            InstallKind::Emulator => f.write_str("emulator"),
        }
    }
}

/// Everything an orchestrator needs to fetch and place one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub kind: InstallKind,
    /// Remote archive; `None` when no URL is configured for this platform.
    pub url: Option<String>,
    /// Checksum sidecar URL, when the archive publishes one.
    pub checksum_url: Option<String>,
    /// File name of the downloaded archive inside the workspace.
    pub archive_name: String,
    pub extract: ExtractStrategy,
    /// Folder, relative to the extraction root, that becomes the install tree.
    pub relocate_from: PathBuf,
    pub install_path: PathBuf,
}

impl InstallTarget {
    /// SDK release for `platform`.
    pub fn sdk(config: &ManagerConfig, platform: Platform, release: SdkRelease) -> Self {
        let url = sdk_archive_url(&config.sdk_base_url, release.version, platform);
        let os_folder = platform.os.folder_name();
        Self {
            kind: InstallKind::Sdk {
                api_level: release.api_level,
            },
            checksum_url: Some(checksum_url(&url)),
            url: Some(url),
            archive_name: sdk_archive_filename(platform).to_string(),
            extract: ExtractStrategy::Tar {
                strip_components: strip_components(release.version, platform.os),
            },
            relocate_from: PathBuf::from(os_folder),
            install_path: config
                .sdk_root
                .join(os_folder)
                .join(release.api_level.to_string()),
        }
    }

    /// Command-line tools bundle for `platform`.
    pub fn command_line_tools(config: &ManagerConfig, platform: Platform) -> Self {
        Self {
            kind: InstallKind::CommandLineTools,
            url: config.tools_urls.for_os(platform.os).map(str::to_string),
            checksum_url: None,
            archive_name: "command-line-tools.zip".to_string(),
            extract: ExtractStrategy::Zip,
            relocate_from: PathBuf::from("command-line-tools"),
            install_path: config.tools_dir.clone(),
        }
    }

    /// Emulator for `platform`.
    pub fn emulator(config: &ManagerConfig, platform: Platform) -> Self {
        Self {
            kind: InstallKind::Emulator,
            url: config.emulator_urls.for_os(platform.os).map(str::to_string),
            checksum_url: None,
            archive_name: "emulator.zip".to_string(),
            extract: ExtractStrategy::Zip,
            relocate_from: PathBuf::from("emulator"),
            install_path: config.emulator_dir.clone(),
        }
    }

    /// Prefix for this target's temp workspace.
    pub fn workspace_prefix(&self) -> &'static str {
        match self.kind {
            InstallKind::Sdk { .. } => "ohsdk-sdk-",
            InstallKind::CommandLineTools => "ohsdk-tools-",
            InstallKind::Emulator => "ohsdk-emulator-",
        }
    }
}
