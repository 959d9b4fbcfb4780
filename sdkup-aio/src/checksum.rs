// sdkup-aio/src/checksum.rs
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sdkup_common::error::{Result, SdkupError};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Lowercase hex SHA-256 of the file's full contents.
pub fn compute_checksum(path: &Path) -> Result<String> {
    debug!("Computing checksum for: {}", path.display());
    let file = File::open(path).map_err(|e| {
        SdkupError::ChecksumError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let bytes_copied = io::copy(&mut reader, &mut hasher).map_err(|e| {
        SdkupError::ChecksumError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let actual = hex::encode(hasher.finalize());
    debug!("Calculated SHA256: {} ({} bytes read)", actual, bytes_copied);
    Ok(actual)
}

pub fn checksums_match(actual: &str, expected: &str) -> bool {
    !expected.is_empty() && actual.trim().eq_ignore_ascii_case(expected.trim())
}
