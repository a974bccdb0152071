//! CLI command implementations.

pub mod common;
pub mod config;
pub mod emulator;
pub mod locate;
pub mod sdk;
pub mod tools;
