/*
File: sdkup-aio/src/fs.rs
Purpose: Filesystem operations on the downloaded package artifact.
*/
use std::fs;
use std::path::Path;

use sdkup_common::error::{Result, SdkupError};
use tracing::{debug, error};

/// Moves `source` to `destination`, replacing whatever is there.
///
/// A single rename on the same filesystem, so the destination always holds
/// either the previous file or the new one.
pub fn promote_file(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(SdkupError::IoError(format!(
            "Downloaded file {} does not exist",
            source.display()
        )));
    }
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                SdkupError::IoError(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    debug!(
        "Moving {} to final location {}",
        source.display(),
        destination.display()
    );
    fs::rename(source, destination).map_err(|e| {
        error!(
            "Failed to move {} to {}: {}",
            source.display(),
            destination.display(),
            e
        );
        SdkupError::IoError(format!(
            "Failed to move {} to {}: {}",
            source.display(),
            destination.display(),
            e
        ))
    })
}

pub fn artifact_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_replaces_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join(".pkg.download");
        let target = dir.path().join("pkg");
        fs::write(&target, b"old").unwrap();
        fs::write(&temp, b"new").unwrap();

        promote_file(&temp, &target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!temp.exists());
    }

    #[test]
    fn promote_without_source_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("pkg");
        fs::write(&target, b"old").unwrap();

        let err = promote_file(&dir.path().join("missing"), &target).unwrap_err();
        assert!(matches!(err, SdkupError::IoError(_)));
        assert_eq!(fs::read(&target).unwrap(), b"old");
    }
}
