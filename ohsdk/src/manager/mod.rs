//! Toolchain manager: download, verify, extract and install.
//!
//! This module installs the three OpenHarmony toolchain components:
//!
//! - SDK API levels, from the release tarballs on the OpenHarmony mirror
//! - the command-line tools bundle (`ohpm` and friends)
//! - the emulator
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ PackageDownloader │──▶│ ArchiveExtractor │──▶│ relocate()       │
//! │ (HttpDownloader)  │   │ (Tar / Zip)      │   │ swap into place  │
//! └───────────────────┘   └──────────────────┘   └──────────────────┘
//!           │                      │                      │
//!           └──── ProgressTracker ─┴─ CancellationSignal ─┘
//! ```
//!
//! The installers ([`SdkInstaller`], [`ToolsInstaller`],
//! [`EmulatorInstaller`]) run these steps inside a [`TempWorkspace`] and
//! report progress as increments on a 0..=100 scale through a
//! [`ProgressSink`].

pub mod cancel;
pub mod config;
pub mod download;
mod error;
pub mod extractor;
pub mod installed;
mod installer;
pub mod locate;
pub mod progress;
mod relocate;
pub mod target;
mod traits;
mod workspace;

pub use cancel::{CancelCallback, CancelToken, CancellationSignal, NeverCancel};
pub use config::{ManagerConfig, PlatformUrls, DEFAULT_SDK_BASE_URL};
pub use download::HttpDownloader;
pub use error::{ManagerError, ManagerResult};
pub use extractor::{ExtractStrategy, TarExtractor, ZipExtractor};
pub use installed::{installed_sdk_levels, remove_emulator, remove_sdk, remove_tools};
pub use installer::{EmulatorInstaller, InstallResult, SdkInstaller, ToolsInstaller};
pub use progress::{
    NoProgress, ProgressBudget, ProgressSink, ProgressTracker, ProgressUpdate, PROGRESS_MAX,
};
pub use relocate::relocate;
pub use target::{InstallKind, InstallTarget, SdkRelease, SDK_RELEASES};
pub use traits::{ArchiveExtractor, ArchivePicker, NoArchivePicker, PackageDownloader};
pub use workspace::TempWorkspace;
