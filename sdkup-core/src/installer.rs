// sdkup-core/src/installer.rs
//! Imports a downloaded `.unitypackage` into a project directory.
//!
//! A package is a gzip-compressed tar in which every asset lives in its own
//! `<guid>/` directory holding `pathname` (the project-relative destination),
//! `asset` (the file contents, absent for folders) and optionally
//! `asset.meta`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use sdkup_common::error::{Result, SdkupError};
use tracing::{debug, info, warn};

/// Applies a package archive to a live project.
pub trait PackageInstaller: Send + Sync {
    fn install(&self, archive_path: &Path, overwrite: bool) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct UnityPackageInstaller {
    project_root: PathBuf,
}

impl UnityPackageInstaller {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn import(&self, archive_path: &Path, overwrite: bool) -> Result<ImportSummary> {
        info!(
            "Importing package {} into {}",
            archive_path.display(),
            self.project_root.display()
        );
        let staging = tempfile::tempdir().map_err(|e| {
            SdkupError::ApplyFailed(format!("Failed to create staging directory: {e}"))
        })?;
        sdkup_aio::unpack_archive(archive_path, staging.path())
            .map_err(|e| SdkupError::ApplyFailed(e.to_string()))?;

        let mut groups: Vec<PathBuf> = fs::read_dir(staging.path())
            .map_err(|e| SdkupError::ApplyFailed(format!("Failed to read staging directory: {e}")))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.path())
            .collect();
        groups.sort();

        // Every destination is checked before anything touches the project.
        let mut planned = Vec::with_capacity(groups.len());
        for group in groups {
            let pathname_file = group.join("pathname");
            if !is_regular_file(&pathname_file) {
                warn!(
                    "Skipping package entry {} without a pathname",
                    group.display()
                );
                continue;
            }
            let raw = fs::read_to_string(&pathname_file).map_err(|e| {
                SdkupError::ApplyFailed(format!(
                    "Failed to read {}: {}",
                    pathname_file.display(),
                    e
                ))
            })?;
            planned.push((parse_pathname(&raw)?, group));
        }

        let mut summary = ImportSummary::default();
        for (relative, group) in &planned {
            let destination = self.project_root.join(relative);
            let asset = group.join("asset");
            let meta = group.join("asset.meta");

            if is_regular_file(&asset) {
                if destination.exists() && !overwrite {
                    debug!("Keeping existing {}", destination.display());
                    summary.skipped += 1;
                    continue;
                }
                copy_into_place(&asset, &destination)?;
            } else if fs::symlink_metadata(&asset).is_ok() {
                warn!(
                    "Skipping {}: package asset is not a regular file",
                    relative.display()
                );
                summary.skipped += 1;
                continue;
            } else {
                fs::create_dir_all(&destination).map_err(|e| apply_io_error(&destination, e))?;
            }
            if is_regular_file(&meta) {
                let mut meta_destination = destination.clone().into_os_string();
                meta_destination.push(".meta");
                copy_into_place(&meta, Path::new(&meta_destination))?;
            }
            debug!("Imported {}", relative.display());
            summary.imported += 1;
        }

        info!(
            "Package import finished: {} imported, {} kept",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }
}

impl PackageInstaller for UnityPackageInstaller {
    fn install(&self, archive_path: &Path, overwrite: bool) -> Result<()> {
        self.import(archive_path, overwrite).map(|_| ())
    }
}

/// First line of a `pathname` file, which must be a plain relative path.
fn parse_pathname(raw: &str) -> Result<PathBuf> {
    let line = raw.lines().next().unwrap_or("").trim();
    let path = PathBuf::from(line);
    let is_plain_relative = !line.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if is_plain_relative {
        Ok(path)
    } else {
        Err(SdkupError::ApplyFailed(format!(
            "Package entry has an unsafe pathname '{line}'"
        )))
    }
}

/// True for a regular file; symlinks are not followed.
fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_file())
}

fn copy_into_place(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| apply_io_error(parent, e))?;
    }
    fs::copy(source, destination).map_err(|e| apply_io_error(destination, e))?;
    Ok(())
}

fn apply_io_error(path: &Path, e: std::io::Error) -> SdkupError {
    SdkupError::ApplyFailed(format!("Failed to write {}: {}", path.display(), e))
}
