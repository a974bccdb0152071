//! Configuration for the toolchain manager.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::platform::Os;

use super::download::DEFAULT_TIMEOUT_SECS;

/// Default mirror hosting SDK release archives.
pub const DEFAULT_SDK_BASE_URL: &str = "https://repo.huaweicloud.com/openharmony/os";

/// Download URLs for one component, per operating system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformUrls {
    pub linux: Option<String>,
    pub darwin: Option<String>,
    pub windows: Option<String>,
}

impl PlatformUrls {
    /// URL configured for `os`, if any. Blank values count as unset.
    pub fn for_os(&self, os: Os) -> Option<&str> {
        let url = match os {
            Os::Linux => self.linux.as_deref(),
            Os::Darwin => self.darwin.as_deref(),
            Os::Windows => self.windows.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    /// Set the URL for `os`.
    pub fn set(&mut self, os: Os, url: impl Into<String>) {
        let slot = match os {
            Os::Linux => &mut self.linux,
            Os::Darwin => &mut self.darwin,
            Os::Windows => &mut self.windows,
        };
        *slot = Some(url.into());
    }
}

/// Configuration consumed by the install pipeline.
///
/// Paths are fully expanded; nothing here is resolved lazily.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Root of installed SDKs (`<sdk_root>/<os>/<api>`).
    pub sdk_root: PathBuf,

    /// Install directory of the command-line tools bundle.
    pub tools_dir: PathBuf,

    /// Install directory of the emulator.
    pub emulator_dir: PathBuf,

    /// Directory for temporary downloads and extraction.
    pub staging_dir: PathBuf,

    /// Mirror hosting `<version>-Release/` SDK folders.
    pub sdk_base_url: String,

    /// Command-line tools download URLs.
    pub tools_urls: PlatformUrls,

    /// Emulator download URLs.
    pub emulator_urls: PlatformUrls,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("openharmony");
        Self {
            sdk_root: root.join("sdk"),
            tools_dir: root.join("command-line-tools"),
            emulator_dir: root.join("emulator"),
            staging_dir: std::env::temp_dir().join("ohsdk"),
            sdk_base_url: DEFAULT_SDK_BASE_URL.to_string(),
            tools_urls: PlatformUrls::default(),
            emulator_urls: PlatformUrls::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ManagerConfig {
    /// Create a configuration with every install directory under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sdk_root: root.join("sdk"),
            tools_dir: root.join("command-line-tools"),
            emulator_dir: root.join("emulator"),
            staging_dir: root.join("staging"),
            ..Default::default()
        }
    }

    /// Build the pipeline configuration from a loaded config file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            sdk_root: file.sdk.root.clone(),
            tools_dir: file.tools.dir.clone(),
            emulator_dir: file.emulator.dir.clone(),
            staging_dir: file.paths.staging_dir.clone(),
            sdk_base_url: file.sdk.base_url.clone(),
            tools_urls: file.tools.urls.clone(),
            emulator_urls: file.emulator.urls.clone(),
            timeout: Duration::from_secs(file.download.timeout_secs),
        }
    }

    /// Set the SDK root.
    pub fn with_sdk_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.sdk_root = path.into();
        self
    }

    /// Set the command-line tools directory.
    pub fn with_tools_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools_dir = path.into();
        self
    }

    /// Set the emulator directory.
    pub fn with_emulator_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.emulator_dir = path.into();
        self
    }

    /// Set the staging directory.
    pub fn with_staging_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_dir = path.into();
        self
    }

    /// Set the SDK mirror base URL. A trailing slash is dropped.
    pub fn with_sdk_base_url(mut self, url: impl Into<String>) -> Self {
        self.sdk_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the command-line tools URL for one OS.
    pub fn with_tools_url(mut self, os: Os, url: impl Into<String>) -> Self {
        self.tools_urls.set(os, url);
        self
    }

    /// Set the emulator URL for one OS.
    pub fn with_emulator_url(mut self, os: Os, url: impl Into<String>) -> Self {
        self.emulator_urls.set(os, url);
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
