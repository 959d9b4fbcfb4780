// sdkup-aio/src/archive.rs
// Gzip-compressed tar archives, the container format of .unitypackage files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sdkup_common::error::{Result, SdkupError};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum ArchiveSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One file inside an archive: its name in the archive and where its data comes from.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub source: ArchiveSource,
}

impl ArchiveEntry {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: ArchiveSource::File(path.into()),
        }
    }

    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: ArchiveSource::Bytes(data.into()),
        }
    }
}

/// Writes `entries` into a new gzip-compressed tar at `output`, replacing any existing file.
pub fn write_archive(entries: &[ArchiveEntry], output: &Path) -> Result<()> {
    debug!(
        "Writing archive {} with {} entries",
        output.display(),
        entries.len()
    );
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output).map_err(|e| {
        SdkupError::IoError(format!("Failed to create {}: {}", output.display(), e))
    })?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        match &entry.source {
            ArchiveSource::File(path) => {
                let mut source = File::open(path).map_err(|e| {
                    SdkupError::IoError(format!("Failed to open {}: {}", path.display(), e))
                })?;
                builder
                    .append_file(&entry.name, &mut source)
                    .map_err(|e| archive_write_error(output, &entry.name, e))?;
            }
            ArchiveSource::Bytes(data) => {
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append_data(&mut header, &entry.name, data.as_slice())
                    .map_err(|e| archive_write_error(output, &entry.name, e))?;
            }
        }
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| archive_write_error(output, "<trailer>", e))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| archive_write_error(output, "<gzip trailer>", e))?;
    writer
        .flush()
        .map_err(|e| archive_write_error(output, "<flush>", e))
}

/// Unpacks a gzip-compressed tar into `target_dir`. Entries escaping the
/// target directory are skipped by the tar reader.
pub fn unpack_archive(archive_path: &Path, target_dir: &Path) -> Result<()> {
    debug!(
        "Extracting archive '{}' to '{}'",
        archive_path.display(),
        target_dir.display()
    );
    fs::create_dir_all(target_dir)?;
    let file = File::open(archive_path).map_err(|e| {
        SdkupError::IoError(format!(
            "Failed to open archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.unpack(target_dir).map_err(|e| {
        SdkupError::IoError(format!(
            "Failed to unpack {}: {}",
            archive_path.display(),
            e
        ))
    })
}

fn archive_write_error(output: &Path, name: &str, e: std::io::Error) -> SdkupError {
    SdkupError::IoError(format!(
        "Failed to write '{}' into {}: {}",
        name,
        output.display(),
        e
    ))
}
