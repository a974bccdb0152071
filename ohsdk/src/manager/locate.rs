//! Locate `ohpm` and `hdc` inside installed trees.

use std::path::PathBuf;

use super::config::ManagerConfig;
use super::error::{ManagerError, ManagerResult};
use super::installed::{installed_sdk_levels, sdk_api_dir};
use crate::platform::Platform;

/// Path of the `ohpm` launcher in the command-line tools.
pub fn ohpm(config: &ManagerConfig, platform: Platform) -> ManagerResult<PathBuf> {
    let path = config
        .tools_dir
        .join("bin")
        .join(format!("ohpm{}", platform.os.script_suffix()));
    if path.is_file() {
        Ok(path)
    } else {
        Err(ManagerError::NotInstalled("ohpm (command-line tools)".to_string()))
    }
}

/// Path of `hdc` in an SDK's toolchains.
///
/// With no API level, the highest installed level that ships `hdc` wins.
pub fn hdc(
    config: &ManagerConfig,
    platform: Platform,
    api_level: Option<u32>,
) -> ManagerResult<PathBuf> {
    let hdc_in = |api: u32| {
        sdk_api_dir(config, platform, api)
            .join("toolchains")
            .join(format!("hdc{}", platform.os.exe_suffix()))
    };

    match api_level {
        Some(api) => {
            let path = hdc_in(api);
            if path.is_file() {
                Ok(path)
            } else {
                Err(ManagerError::NotInstalled(format!("hdc (SDK API {})", api)))
            }
        }
        None => installed_sdk_levels(config, platform)?
            .into_iter()
            .rev()
            .map(hdc_in)
            .find(|path| path.is_file())
            .ok_or_else(|| ManagerError::NotInstalled("hdc (no SDK installed)".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use std::fs;
    use tempfile::TempDir;

    const LINUX: Platform = Platform::new(Os::Linux, Arch::X64);
    const WINDOWS: Platform = Platform::new(Os::Windows, Arch::X64);

    fn touch(path: &std::path::Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_ohpm_found() {
        let temp = TempDir::new().unwrap();
        let config = ManagerConfig::new(temp.path());
        touch(&config.tools_dir.join("bin/ohpm"));

        assert_eq!(ohpm(&config, LINUX).unwrap(), config.tools_dir.join("bin/ohpm"));
        assert!(ohpm(&config, WINDOWS).is_err());
    }

    #[test]
    fn test_ohpm_missing() {
        let temp = TempDir::new().unwrap();
        let config = ManagerConfig::new(temp.path());
        assert!(matches!(ohpm(&config, LINUX), Err(ManagerError::NotInstalled(_))));
    }

    #[test]
    fn test_hdc_highest_level_wins() {
        let temp = TempDir::new().unwrap();
        let config = ManagerConfig::new(temp.path());
        touch(&config.sdk_root.join("linux/12/toolchains/hdc"));
        touch(&config.sdk_root.join("linux/14/toolchains/hdc"));
        fs::create_dir_all(config.sdk_root.join("linux/18/ets")).unwrap();

        assert_eq!(
            hdc(&config, LINUX, None).unwrap(),
            config.sdk_root.join("linux/14/toolchains/hdc")
        );
    }

    #[test]
    fn test_hdc_specific_level() {
        let temp = TempDir::new().unwrap();
        let config = ManagerConfig::new(temp.path());
        touch(&config.sdk_root.join("windows/12/toolchains/hdc.exe"));

        assert_eq!(
            hdc(&config, WINDOWS, Some(12)).unwrap(),
            config.sdk_root.join("windows/12/toolchains/hdc.exe")
        );
        assert!(hdc(&config, WINDOWS, Some(14)).is_err());
        assert!(hdc(&config, LINUX, None).is_err());
    }
}
