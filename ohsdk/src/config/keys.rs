//! Addressable configuration keys for `config get` / `config set`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::file::{parse_timeout, ConfigFile, ConfigFileError};
use crate::platform::Os;

/// Returned when parsing a name that is not a known key.
#[derive(Debug, Clone, Error)]
#[error("unknown configuration key '{0}'")]
pub struct UnknownConfigKey(pub String);

/// A single setting in `config.ini`, named `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    SdkRoot,
    SdkBaseUrl,
    ToolsDir,
    ToolsUrl(Os),
    EmulatorDir,
    EmulatorUrl(Os),
    DownloadTimeout,
    PathsStagingDir,
    LoggingDir,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> Vec<ConfigKey> {
        let mut keys = vec![ConfigKey::SdkRoot, ConfigKey::SdkBaseUrl, ConfigKey::ToolsDir];
        keys.extend(Os::ALL.iter().map(|&os| ConfigKey::ToolsUrl(os)));
        keys.push(ConfigKey::EmulatorDir);
        keys.extend(Os::ALL.iter().map(|&os| ConfigKey::EmulatorUrl(os)));
        keys.extend([
            ConfigKey::DownloadTimeout,
            ConfigKey::PathsStagingDir,
            ConfigKey::LoggingDir,
        ]);
        keys
    }

    /// Section the key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::SdkRoot | ConfigKey::SdkBaseUrl => "sdk",
            ConfigKey::ToolsDir | ConfigKey::ToolsUrl(_) => "tools",
            ConfigKey::EmulatorDir | ConfigKey::EmulatorUrl(_) => "emulator",
            ConfigKey::DownloadTimeout => "download",
            ConfigKey::PathsStagingDir => "paths",
            ConfigKey::LoggingDir => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::SdkRoot => "root",
            ConfigKey::SdkBaseUrl => "base_url",
            ConfigKey::ToolsDir | ConfigKey::EmulatorDir => "dir",
            ConfigKey::ToolsUrl(os) | ConfigKey::EmulatorUrl(os) => match os {
                Os::Linux => "url_linux",
                Os::Darwin => "url_darwin",
                Os::Windows => "url_windows",
            },
            ConfigKey::DownloadTimeout => "timeout",
            ConfigKey::PathsStagingDir => "staging_dir",
            ConfigKey::LoggingDir => "dir",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SdkRoot => config.sdk.root.display().to_string(),
            ConfigKey::SdkBaseUrl => config.sdk.base_url.clone(),
            ConfigKey::ToolsDir => config.tools.dir.display().to_string(),
            ConfigKey::ToolsUrl(os) => config.tools.urls.for_os(*os).unwrap_or_default().to_string(),
            ConfigKey::EmulatorDir => config.emulator.dir.display().to_string(),
            ConfigKey::EmulatorUrl(os) => config
                .emulator
                .urls
                .for_os(*os)
                .unwrap_or_default()
                .to_string(),
            ConfigKey::DownloadTimeout => config.download.timeout_secs.to_string(),
            ConfigKey::PathsStagingDir => config.paths.staging_dir.display().to_string(),
            ConfigKey::LoggingDir => config.logging.dir.display().to_string(),
        }
    }

    /// Validate and store `value`. An empty URL clears it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let value = value.trim();
        match self {
            ConfigKey::SdkRoot => config.sdk.root = self.path_value(config, value)?,
            ConfigKey::SdkBaseUrl => {
                self.check_url(value)?;
                config.sdk.base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::ToolsDir => config.tools.dir = self.path_value(config, value)?,
            ConfigKey::ToolsUrl(os) => {
                self.check_optional_url(value)?;
                config.tools.urls.set(*os, value);
            }
            ConfigKey::EmulatorDir => config.emulator.dir = self.path_value(config, value)?,
            ConfigKey::EmulatorUrl(os) => {
                self.check_optional_url(value)?;
                config.emulator.urls.set(*os, value);
            }
            ConfigKey::DownloadTimeout => {
                config.download.timeout_secs = parse_timeout(&self.name(), value)?;
            }
            ConfigKey::PathsStagingDir => {
                config.paths.staging_dir = self.path_value(config, value)?;
            }
            ConfigKey::LoggingDir => config.logging.dir = self.path_value(config, value)?,
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigFileError {
        ConfigFileError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn path_value(
        &self,
        config: &mut ConfigFile,
        value: &str,
    ) -> Result<std::path::PathBuf, ConfigFileError> {
        if value.is_empty() {
            return Err(self.invalid(value, "path must not be empty"));
        }
        Ok(config.assign_path(&self.name(), value))
    }

    fn check_url(&self, value: &str) -> Result<(), ConfigFileError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(())
        } else {
            Err(self.invalid(value, "expected an http:// or https:// URL"))
        }
    }

    fn check_optional_url(&self, value: &str) -> Result<(), ConfigFileError> {
        if value.is_empty() {
            Ok(())
        } else {
            self.check_url(value)
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = UnknownConfigKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .into_iter()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| UnknownConfigKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_all_names_unique_and_parseable() {
        let keys = ConfigKey::all();
        assert_eq!(keys.len(), 13);
        for key in &keys {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let key: ConfigKey = "Tools.URL_Linux".parse().unwrap();
        assert_eq!(key, ConfigKey::ToolsUrl(Os::Linux));
    }

    #[test]
    fn test_unknown_key() {
        assert!("sdk.nope".parse::<ConfigKey>().is_err());
        assert!("root".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_and_get_url() {
        let mut config = ConfigFile::default();
        let key = ConfigKey::EmulatorUrl(Os::Windows);

        assert_eq!(key.get(&config), "");
        key.set(&mut config, "https://example.com/emu.zip").unwrap();
        assert_eq!(key.get(&config), "https://example.com/emu.zip");

        key.set(&mut config, "").unwrap();
        assert_eq!(key.get(&config), "");
    }

    #[test]
    fn test_set_rejects_bad_url() {
        let mut config = ConfigFile::default();
        let result = ConfigKey::SdkBaseUrl.set(&mut config, "ftp://mirror");
        assert!(matches!(result, Err(ConfigFileError::InvalidValue { .. })));
    }

    #[test]
    fn test_set_timeout() {
        let mut config = ConfigFile::default();
        ConfigKey::DownloadTimeout.set(&mut config, "120").unwrap();
        assert_eq!(config.download.timeout_secs, 120);
        assert!(ConfigKey::DownloadTimeout.set(&mut config, "0").is_err());
    }

    #[test]
    fn test_set_path() {
        let mut config = ConfigFile::default();
        ConfigKey::SdkRoot.set(&mut config, "/opt/oh/sdk").unwrap();
        assert_eq!(config.sdk.root, PathBuf::from("/opt/oh/sdk"));
        assert!(ConfigKey::SdkRoot.set(&mut config, "  ").is_err());
    }

    #[test]
    fn test_set_placeholder_path_is_saved_as_written() {
        let mut config = ConfigFile::default();
        ConfigKey::ToolsDir
            .set(&mut config, "${userHome}/oh/tools")
            .unwrap();
        assert!(!config.tools.dir.to_string_lossy().contains("${userHome}"));

        let ini = config.to_ini();
        let tools = ini.section(Some("tools")).unwrap();
        assert_eq!(tools.get("dir"), Some("${userHome}/oh/tools"));

        ConfigKey::ToolsDir.set(&mut config, "/opt/oh/tools").unwrap();
        let ini = config.to_ini();
        let tools = ini.section(Some("tools")).unwrap();
        assert_eq!(tools.get("dir"), Some("/opt/oh/tools"));
    }

    #[test]
    fn test_sections_in_file_order() {
        let sections: Vec<_> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut deduped = sections.clone();
        deduped.dedup();
        assert_eq!(
            deduped,
            vec!["sdk", "tools", "emulator", "download", "paths", "logging"]
        );
    }
}
