//! Shared fixtures for integration tests.
//!
//! - [`OneShotServer`]: a single-connection HTTP/1.1 server on localhost
//! - [`FileDownloader`]: a [`PackageDownloader`] backed by local files
//! - archive builders for SDK tarballs and zips

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use ohsdk::manager::download::calculate_file_checksum;
use ohsdk::manager::{
    CancellationSignal, ManagerError, ManagerResult, PackageDownloader, ProgressSink,
    ProgressTracker, ProgressUpdate,
};

// ============================================================================
// HTTP fixture
// ============================================================================

/// Serves exactly one connection, then exits.
pub struct OneShotServer {
    pub url: String,
    handle: Option<JoinHandle<()>>,
}

impl OneShotServer {
    /// Accept one connection, consume the request head, hand the stream to `handler`.
    pub fn start<F>(path: &str, handler: F) -> Self
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request_head(&mut stream);
                handler(stream);
            }
        });

        Self {
            url: format!("http://{}{}", addr, path),
            handle: Some(handle),
        }
    }

    /// `200 OK` with a `Content-Length` header.
    pub fn ok(body: Vec<u8>) -> Self {
        Self::start("/archive.bin", move |mut stream| {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        })
    }

    /// `200 OK` without a length; the body ends when the connection closes.
    pub fn ok_without_length(body: Vec<u8>) -> Self {
        Self::start("/archive.bin", move |mut stream| {
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(&body);
        })
    }

    /// Empty response with the given status line, e.g. `404 Not Found`.
    pub fn status(status: &'static str) -> Self {
        Self::start("/archive.bin", move |mut stream| {
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(head.as_bytes());
        })
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: String) -> Self {
        Self::start("/moved.bin", move |mut stream| {
            let head = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                location
            );
            let _ = stream.write_all(head.as_bytes());
        })
    }

    /// Wait for the server thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
}

// ============================================================================
// Progress and downloads
// ============================================================================

/// Sink recording every increment and the running total.
#[derive(Default)]
pub struct RecordingSink {
    pub updates: RefCell<Vec<ProgressUpdate>>,
}

impl RecordingSink {
    pub fn increments(&self) -> Vec<u32> {
        self.updates.borrow().iter().map(|u| u.increment).collect()
    }

    pub fn total(&self) -> u32 {
        self.increments().iter().sum()
    }

    /// Running totals starting from `offset`.
    pub fn totals_from(&self, offset: u32) -> Vec<u32> {
        let mut total = offset;
        self.increments()
            .into_iter()
            .map(|inc| {
                total += inc;
                total
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, update: &ProgressUpdate) {
        self.updates.borrow_mut().push(update.clone());
    }
}

/// Downloader serving URLs from local files.
#[derive(Default)]
pub struct FileDownloader {
    files: HashMap<String, PathBuf>,
    pub calls: Cell<usize>,
}

impl FileDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(url.into(), path.into());
        self
    }
}

impl PackageDownloader for FileDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut ProgressTracker<'_>,
        cancel: &dyn CancellationSignal,
    ) -> ManagerResult<u64> {
        cancel.checkpoint()?;
        self.calls.set(self.calls.get() + 1);

        let source = self.files.get(url).ok_or_else(|| ManagerError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })?;
        let bytes = fs::copy(source, dest).map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        progress.update(50.0);
        cancel.checkpoint()?;
        progress.finish();
        Ok(bytes)
    }
}

// ============================================================================
// Archive builders
// ============================================================================

/// One zip entry: (path, contents, unix mode). Paths ending in `/` are directories.
pub type ZipEntry<'a> = (&'a str, &'a [u8], u32);

/// Zip bytes with the given entries.
pub fn zip_bytes(entries: &[ZipEntry<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents, mode) in entries {
        let options = SimpleFileOptions::default().unix_permissions(*mode);
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Write a zip file with the given entries.
pub fn write_zip(path: &Path, entries: &[ZipEntry<'_>]) {
    fs::write(path, zip_bytes(entries)).unwrap();
}

/// Write a `.tar.gz` holding `(path, bytes)` files.
pub fn write_tarball(path: &Path, files: &[(String, Vec<u8>)]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, name, contents.as_slice())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Write an SDK release tarball.
///
/// Each component becomes `<prefix><os>/<component>.zip` whose entries live
/// under `<component>/`.
pub fn write_sdk_tarball(
    path: &Path,
    prefix: &str,
    os: &str,
    components: &[(&str, &[ZipEntry<'_>])],
) {
    let files: Vec<(String, Vec<u8>)> = components
        .iter()
        .map(|(component, entries)| {
            let nested: Vec<(String, &[u8], u32)> = entries
                .iter()
                .map(|(name, contents, mode)| (format!("{}/{}", component, name), *contents, *mode))
                .collect();
            let refs: Vec<ZipEntry<'_>> = nested
                .iter()
                .map(|(name, contents, mode)| (name.as_str(), *contents, *mode))
                .collect();
            (format!("{}{}/{}.zip", prefix, os, component), zip_bytes(&refs))
        })
        .collect();
    write_tarball(path, &files);
}

/// Write a `.sha256` sidecar for `archive` in the usual `<digest>  <name>` form.
pub fn write_sidecar(archive: &Path, sidecar: &Path) {
    let digest = calculate_file_checksum(archive).unwrap();
    let name = archive.file_name().unwrap().to_string_lossy();
    fs::write(sidecar, format!("{}  {}\n", digest, name)).unwrap();
}

/// Number of entries left in `dir` (zero if it does not exist).
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
