//! Loading and saving `config.ini`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::manager::config::DEFAULT_SDK_BASE_URL;
use crate::manager::download::DEFAULT_TIMEOUT_SECS;
use crate::manager::PlatformUrls;
use crate::platform::Os;

/// Placeholder replaced with the user's home directory.
const USER_HOME_PLACEHOLDER: &str = "${userHome}";

/// Errors raised while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[sdk]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkSettings {
    pub root: PathBuf,
    pub base_url: String,
}

/// `[tools]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsSettings {
    pub dir: PathBuf,
    pub urls: PlatformUrls,
}

/// `[emulator]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorSettings {
    pub dir: PathBuf,
    pub urls: PlatformUrls,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    pub staging_dir: PathBuf,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub dir: PathBuf,
}

/// Parsed configuration file with every placeholder expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub sdk: SdkSettings,
    pub tools: ToolsSettings,
    pub emulator: EmulatorSettings,
    pub download: DownloadSettings,
    pub paths: PathSettings,
    pub logging: LoggingSettings,
    /// Path values as written, for keys whose text contained a placeholder.
    path_sources: BTreeMap<String, String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let root = home_dir().join("openharmony");
        Self {
            sdk: SdkSettings {
                root: root.join("sdk"),
                base_url: DEFAULT_SDK_BASE_URL.to_string(),
            },
            tools: ToolsSettings {
                dir: root.join("command-line-tools"),
                urls: PlatformUrls::default(),
            },
            emulator: EmulatorSettings {
                dir: root.join("emulator"),
                urls: PlatformUrls::default(),
            },
            download: DownloadSettings {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            paths: PathSettings {
                staging_dir: std::env::temp_dir().join("ohsdk"),
            },
            logging: LoggingSettings {
                dir: dirs::data_local_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join("ohsdk")
                    .join("logs"),
            },
            path_sources: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Load the config file from its standard location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load a config file from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini)
    }

    /// Build a config from parsed INI data, falling back to defaults per key.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigFileError> {
        let mut config = Self::default();
        let get = |section: &str, key: &str| {
            ini.section(Some(section))
                .and_then(|s| s.get(key))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("sdk", "root") {
            config.sdk.root = config.assign_path("sdk.root", v);
        }
        if let Some(v) = get("sdk", "base_url") {
            config.sdk.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("tools", "dir") {
            config.tools.dir = config.assign_path("tools.dir", v);
        }
        if let Some(v) = get("emulator", "dir") {
            config.emulator.dir = config.assign_path("emulator.dir", v);
        }
        for os in Os::ALL {
            let key = url_key(os);
            if let Some(v) = get("tools", &key) {
                config.tools.urls.set(os, v);
            }
            if let Some(v) = get("emulator", &key) {
                config.emulator.urls.set(os, v);
            }
        }
        if let Some(v) = get("download", "timeout") {
            config.download.timeout_secs = parse_timeout("download.timeout", v)?;
        }
        if let Some(v) = get("paths", "staging_dir") {
            config.paths.staging_dir = config.assign_path("paths.staging_dir", v);
        }
        if let Some(v) = get("logging", "dir") {
            config.logging.dir = config.assign_path("logging.dir", v);
        }

        Ok(config)
    }

    /// Render the config as INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("sdk"))
            .set("root", self.path_text("sdk.root", &self.sdk.root))
            .set("base_url", self.sdk.base_url.as_str());

        ini.with_section(Some("tools"))
            .set("dir", self.path_text("tools.dir", &self.tools.dir));
        ini.with_section(Some("emulator"))
            .set("dir", self.path_text("emulator.dir", &self.emulator.dir));
        for os in Os::ALL {
            if let Some(url) = self.tools.urls.for_os(os) {
                ini.with_section(Some("tools")).set(url_key(os), url);
            }
            if let Some(url) = self.emulator.urls.for_os(os) {
                ini.with_section(Some("emulator")).set(url_key(os), url);
            }
        }

        ini.with_section(Some("download"))
            .set("timeout", self.download.timeout_secs.to_string());
        ini.with_section(Some("paths"))
            .set(
                "staging_dir",
                self.path_text("paths.staging_dir", &self.paths.staging_dir),
            );
        ini.with_section(Some("logging"))
            .set("dir", self.path_text("logging.dir", &self.logging.dir));

        ini
    }

    /// Expand `raw` for the path key `name`, remembering the written text
    /// when it contains a placeholder.
    pub(crate) fn assign_path(&mut self, name: &str, raw: &str) -> PathBuf {
        let expanded = expand_placeholders(raw);
        if expanded == raw {
            self.path_sources.remove(name);
        } else {
            self.path_sources.insert(name.to_string(), raw.to_string());
        }
        PathBuf::from(expanded)
    }

    /// Text to save for a path key. The remembered text is used only while it
    /// still expands to `path`.
    fn path_text(&self, name: &str, path: &Path) -> String {
        match self.path_sources.get(name) {
            Some(raw) if Path::new(&expand_placeholders(raw)) == path => raw.clone(),
            _ => path.to_string_lossy().into_owned(),
        }
    }

    /// Save to the standard location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_failed = |source: io::Error| ConfigFileError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        self.to_ini().write_to_file(path).map_err(write_failed)?;

        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }
}

/// Standard location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home_dir().join(".config"))
        .join("ohsdk")
        .join("config.ini")
}

/// Expand `${userHome}` anywhere in `value` and a leading `~`.
pub fn expand_placeholders(value: &str) -> String {
    let home = home_dir();
    let home = home.to_string_lossy();

    let expanded = value.replace(USER_HOME_PLACEHOLDER, &home);
    if expanded == "~" {
        home.into_owned()
    } else if let Some(rest) = expanded
        .strip_prefix("~/")
        .or_else(|| expanded.strip_prefix("~\\"))
    {
        format!("{}/{}", home.trim_end_matches(['/', '\\']), rest)
    } else {
        expanded
    }
}

pub(crate) fn parse_timeout(key: &str, value: &str) -> Result<u64, ConfigFileError> {
    let invalid = |reason: &str| ConfigFileError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(secs) => Ok(secs),
        Err(_) => Err(invalid("expected a number of seconds")),
    }
}

pub(crate) fn url_key(os: Os) -> String {
    format!("url_{}", os.folder_name())
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
