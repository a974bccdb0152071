//! User configuration stored in an INI file.
//!
//! The file lives at `<config dir>/ohsdk/config.ini` and is optional; every
//! key has a default. Path values may use `${userHome}` or a leading `~`,
//! both expanded once when the file is loaded.
//!
//! [`ConfigFile`] is the parsed file, [`ConfigKey`] addresses single
//! settings for `config get` / `config set`, and
//! [`ManagerConfig::from_config_file`](crate::manager::ManagerConfig::from_config_file)
//! turns the file into what the install pipeline consumes.

mod file;
mod keys;

pub use file::{
    config_file_path, expand_placeholders, ConfigFile, ConfigFileError, DownloadSettings,
    EmulatorSettings, LoggingSettings, PathSettings, SdkSettings, ToolsSettings,
};
pub use keys::{ConfigKey, UnknownConfigKey};
