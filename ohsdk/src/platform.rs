//! Host platform detection and naming.

use std::fmt;

use crate::manager::{ManagerError, ManagerResult};

/// Operating systems with published toolchain archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// All supported operating systems.
    pub const ALL: [Os; 3] = [Os::Linux, Os::Darwin, Os::Windows];

    /// Folder name used inside SDK archives and the SDK root.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }

    /// Suffix appended to native executables.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Os::Windows => ".exe",
            _ => "",
        }
    }

    /// Suffix of launcher scripts (`ohpm` ships as a shell script or batch file).
    pub fn script_suffix(&self) -> &'static str {
        match self {
            Os::Windows => ".bat",
            _ => "",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// CPU architectures with published toolchain archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Arm64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X64 => f.write_str("x64"),
            Arch::Arm64 => f.write_str("arm64"),
        }
    }
}

/// An OS and architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this binary was built for.
    pub fn current() -> ManagerResult<Self> {
        Self::from_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust target names (`std::env::consts`) to a platform.
    pub fn from_target(os: &str, arch: &str) -> ManagerResult<Self> {
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Darwin,
            "windows" => Os::Windows,
            other => return Err(ManagerError::UnsupportedPlatform(other.to_string())),
        };
        let arch = match arch {
            "x86_64" => Arch::X64,
            "aarch64" => Arch::Arm64,
            other => return Err(ManagerError::UnsupportedPlatform(format!("{} {}", os, other))),
        };
        Ok(Self { os, arch })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
