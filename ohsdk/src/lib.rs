//! ohsdk - OpenHarmony toolchain manager
//!
//! This library downloads, verifies, extracts and installs OpenHarmony SDK
//! API levels, the command-line tools bundle and the emulator, and locates
//! the `ohpm` and `hdc` executables inside installed trees.
//!
//! The install pipeline lives in [`manager`]; [`config`] reads the user's
//! `config.ini`; [`platform`] names the host OS and architecture the way
//! release archives do.

pub mod config;
pub mod logging;
pub mod manager;
pub mod platform;

/// Library version, as published in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
