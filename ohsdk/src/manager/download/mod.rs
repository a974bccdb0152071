//! Archive downloads and integrity checks.
//!
//! - Streaming HTTP(S) downloads with progress and cancellation (`http`)
//! - SHA-256 verification against `.sha256` sidecar files (`checksum`)
//!
//! # Example
//!
//! ```ignore
//! use ohsdk::manager::{CancelToken, HttpDownloader, NoProgress, PackageDownloader};
//! use ohsdk::manager::{ProgressBudget, ProgressTracker};
//!
//! let downloader = HttpDownloader::new()?;
//! let cancel = CancelToken::new();
//! let mut progress = ProgressTracker::new(&NoProgress, ProgressBudget::FULL, "Downloading");
//!
//! downloader.download(url, &dest, &mut progress, &cancel)?;
//! ohsdk::manager::download::verify_sidecar(&dest, &sidecar)?;
//! ```

mod checksum;
mod http;

pub use checksum::{calculate_file_checksum, read_sidecar_digest, verify_checksum, verify_sidecar};
pub use http::{HttpDownloader, DEFAULT_TIMEOUT_SECS};
