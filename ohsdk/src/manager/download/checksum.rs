//! SHA-256 verification of downloaded archives against `.sha256` sidecars.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::manager::error::{ManagerError, ManagerResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 digest of a file, streaming it in chunks.
///
/// Returns the lowercase hexadecimal digest.
pub fn calculate_file_checksum(path: &Path) -> ManagerResult<String> {
    let mut file = File::open(path).map_err(|e| ManagerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ManagerError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Read the expected digest from a sidecar file.
///
/// Sidecars follow the `sha256sum` convention: the first whitespace-delimited
/// token is the digest, anything after it (usually the file name) is ignored.
pub fn read_sidecar_digest(sidecar: &Path) -> ManagerResult<String> {
    let contents = fs::read_to_string(sidecar).map_err(|e| ManagerError::ReadFailed {
        path: sidecar.to_path_buf(),
        source: e,
    })?;

    contents
        .split_whitespace()
        .next()
        .map(|token| token.to_ascii_lowercase())
        .ok_or_else(|| ManagerError::InvalidChecksumFile {
            path: sidecar.to_path_buf(),
        })
}

/// Verify that a file matches an expected digest.
pub fn verify_checksum(path: &Path, expected: &str) -> ManagerResult<()> {
    let expected = expected.to_ascii_lowercase();
    let actual = calculate_file_checksum(path)?;
    if actual != expected {
        return Err(ManagerError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected,
            actual,
        });
    }
    debug!(path = %path.display(), digest = %actual, "Checksum verified");
    Ok(())
}

/// Verify a file against the digest published in its sidecar file.
pub fn verify_sidecar(path: &Path, sidecar: &Path) -> ManagerResult<()> {
    let expected = read_sidecar_digest(sidecar)?;
    verify_checksum(path, &expected)?;
    info!(path = %path.display(), "Archive integrity verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_calculate_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "test.txt", b"hello world");

        let checksum = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(checksum, HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_calculate_empty_file() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "empty.txt", b"");

        let checksum = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_calculate_nonexistent_file() {
        let result = calculate_file_checksum(Path::new("/nonexistent/file.txt"));
        assert!(matches!(result, Err(ManagerError::ReadFailed { .. })));
    }

    #[test]
    fn test_read_sidecar_with_filename() {
        let temp = TempDir::new().unwrap();
        let sidecar = write_file(
            &temp,
            "sdk.tar.gz.sha256",
            format!("{}  ohos-sdk-windows_linux-public.tar.gz\n", HELLO_WORLD_SHA256.to_uppercase())
                .as_bytes(),
        );

        assert_eq!(read_sidecar_digest(&sidecar).unwrap(), HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_read_empty_sidecar() {
        let temp = TempDir::new().unwrap();
        let sidecar = write_file(&temp, "empty.sha256", b"  \n");

        let result = read_sidecar_digest(&sidecar);
        assert!(matches!(result, Err(ManagerError::InvalidChecksumFile { .. })));
    }

    #[test]
    fn test_verify_sidecar_round_trip() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "archive.tar.gz", b"hello world");
        let digest = calculate_file_checksum(&file_path).unwrap();
        let sidecar = write_file(&temp, "archive.tar.gz.sha256", digest.as_bytes());

        assert!(verify_sidecar(&file_path, &sidecar).is_ok());
    }

    #[test]
    fn test_verify_sidecar_flipped_character() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "archive.tar.gz", b"hello world");
        let digest = calculate_file_checksum(&file_path).unwrap();

        let mut tampered: Vec<char> = digest.chars().collect();
        tampered[0] = if tampered[0] == 'a' { 'b' } else { 'a' };
        let tampered: String = tampered.into_iter().collect();
        let sidecar = write_file(&temp, "archive.tar.gz.sha256", tampered.as_bytes());

        match verify_sidecar(&file_path, &sidecar) {
            Err(ManagerError::ChecksumMismatch {
                filename,
                expected,
                actual,
            }) => {
                assert_eq!(filename, "archive.tar.gz");
                assert_eq!(expected, tampered);
                assert_eq!(actual, digest);
            }
            other => panic!("Expected ChecksumMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_large_file_checksum() {
        let temp = TempDir::new().unwrap();
        // Larger than the read buffer
        let file_path = write_file(&temp, "large.bin", &vec![0xABu8; 100_000]);

        let checksum = calculate_file_checksum(&file_path).unwrap();
        let checksum2 = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(checksum, checksum2);
        assert_eq!(checksum.len(), 64);
    }
}
