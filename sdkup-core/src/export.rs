// sdkup-core/src/export.rs
//! Bundles project paths into a `.unitypackage`, the same format the updater
//! downloads and imports.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sdkup_aio::ArchiveEntry;
use sdkup_common::error::{Result, SdkupError};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub assets: usize,
    pub folders: usize,
    pub unmatched_patterns: Vec<String>,
}

/// Exports everything matched by `patterns` (globs relative to
/// `project_root`, directories walked recursively) into one package at `output`.
pub fn export_package(
    project_root: &Path,
    patterns: &[String],
    output: &Path,
) -> Result<ExportSummary> {
    let canonical_root = fs::canonicalize(project_root).map_err(|e| {
        SdkupError::ExportError(format!(
            "Project root {} is not accessible: {}",
            project_root.display(),
            e
        ))
    })?;
    let project_root = canonical_root.as_path();
    let resolved_output = resolve_output(output)?;
    let root_pattern = glob::Pattern::escape(&project_root.to_string_lossy());
    // Relative path -> (absolute path, is_dir). Sorted so archives are reproducible.
    let mut items: BTreeMap<String, (PathBuf, bool)> = BTreeMap::new();
    let mut unmatched_patterns = Vec::new();

    for pattern in patterns {
        let full_pattern = format!("{}/{}", root_pattern, pattern.trim_matches('/'));
        let matches = glob::glob(&full_pattern).map_err(|e| {
            SdkupError::ExportError(format!("Invalid export pattern '{pattern}': {e}"))
        })?;

        let mut matched = false;
        for entry in matches {
            let path = entry.map_err(|e| {
                SdkupError::ExportError(format!("Failed to read match for '{pattern}': {e}"))
            })?;
            matched = true;
            for walked in WalkDir::new(&path).follow_links(false) {
                let walked = walked.map_err(|e| {
                    SdkupError::ExportError(format!("Failed to walk {}: {}", path.display(), e))
                })?;
                let file_type = walked.file_type();
                if !file_type.is_dir() && !file_type.is_file() {
                    continue;
                }
                let abs = walked.path();
                if is_meta_file(abs) || abs == resolved_output {
                    continue;
                }
                let Some(relative) = relative_name(project_root, abs) else {
                    continue;
                };
                items.insert(relative, (abs.to_path_buf(), file_type.is_dir()));
            }
        }
        if !matched {
            warn!("Export pattern '{}' matched nothing", pattern);
            unmatched_patterns.push(pattern.clone());
        }
    }

    let assets = items.values().filter(|(_, is_dir)| !is_dir).count();
    if assets == 0 {
        return Err(SdkupError::ExportError(format!(
            "Nothing to export from {}",
            project_root.display()
        )));
    }

    let mut entries = Vec::with_capacity(items.len() * 3);
    for (relative, (abs, is_dir)) in &items {
        let meta = meta_path(abs);
        let guid = read_guid(&meta).unwrap_or_else(|| derived_guid(relative));
        debug!("Exporting {} as {}", relative, guid);
        entries.push(ArchiveEntry::bytes(
            format!("{guid}/pathname"),
            relative.as_bytes(),
        ));
        if !is_dir {
            entries.push(ArchiveEntry::file(format!("{guid}/asset"), abs));
        }
        if meta.is_file() {
            entries.push(ArchiveEntry::file(format!("{guid}/asset.meta"), &meta));
        }
    }

    sdkup_aio::write_archive(&entries, output)?;
    let summary = ExportSummary {
        output: output.to_path_buf(),
        assets,
        folders: items.len() - assets,
        unmatched_patterns,
    };
    info!(
        "Project Exported: {} assets, {} folders -> {}",
        summary.assets,
        summary.folders,
        output.display()
    );
    Ok(summary)
}

/// Absolute form of `output` with its directory canonicalized, comparable
/// against paths walked under the canonical project root.
fn resolve_output(output: &Path) -> Result<PathBuf> {
    let absolute = if output.is_absolute() {
        output.to_path_buf()
    } else {
        std::env::current_dir()?.join(output)
    };
    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return Ok(absolute);
    };
    Ok(fs::canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or(absolute))
}

fn is_meta_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "meta")
}

fn meta_path(path: &Path) -> PathBuf {
    let mut meta = path.as_os_str().to_owned();
    meta.push(".meta");
    PathBuf::from(meta)
}

/// Project-relative name with `/` separators.
fn relative_name(project_root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(project_root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// The `guid:` value from an asset's `.meta` file.
fn read_guid(meta: &Path) -> Option<String> {
    let contents = fs::read_to_string(meta).ok()?;
    contents.lines().find_map(|line| {
        let value = line.trim().strip_prefix("guid:")?.trim();
        let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| value.to_string())
    })
}

fn derived_guid(relative: &str) -> String {
    let digest = hex::encode(Sha256::digest(relative.as_bytes()));
    digest[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::UnityPackageInstaller;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn exported_package_imports_into_fresh_project() {
        let source = tempfile::tempdir().unwrap();
        write(source.path(), "Assets/Editor/Build.cs", "class Build {}");
        write(
            source.path(),
            "Assets/Editor/Build.cs.meta",
            "fileFormatVersion: 2\nguid: 4f2a9c0d11e24b5c8d7e6f5a4b3c2d1e\n",
        );
        write(source.path(), "Assets/Standard Assets/Water/Water.shader", "Shader {}");
        write(source.path(), "ProjectSettings/TagManager.asset", "tags: []");
        write(source.path(), "Assets/Scenes/Private.unity", "not exported");

        let patterns: Vec<String> = sdkup_common::config::DEFAULT_EXPORT_PATHS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = source.path().join("CreatorSDK.unitypackage");
        let summary = export_package(source.path(), &patterns, &output).unwrap();

        assert_eq!(summary.assets, 3);
        assert_eq!(
            summary.unmatched_patterns,
            vec!["Assets/Engage_CreatorSDK".to_string()]
        );

        let target = tempfile::tempdir().unwrap();
        UnityPackageInstaller::new(target.path())
            .import(&output, true)
            .unwrap();
        assert_eq!(
            fs::read_to_string(target.path().join("Assets/Editor/Build.cs")).unwrap(),
            "class Build {}"
        );
        assert!(target.path().join("Assets/Editor/Build.cs.meta").is_file());
        assert!(target
            .path()
            .join("Assets/Standard Assets/Water/Water.shader")
            .is_file());
        assert!(target.path().join("ProjectSettings/TagManager.asset").is_file());
        assert!(!target.path().join("Assets/Scenes/Private.unity").exists());
    }

    #[test]
    fn guid_comes_from_meta_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("Tool.cs.meta");
        fs::write(&meta, "fileFormatVersion: 2\nguid: abc123def\n").unwrap();
        assert_eq!(read_guid(&meta).as_deref(), Some("abc123def"));
        assert_eq!(read_guid(&dir.path().join("absent.meta")), None);
        assert_eq!(derived_guid("Assets/Editor/Tool.cs").len(), 32);
    }

    #[test]
    fn package_inside_exported_folder_is_not_archived() {
        let source = tempfile::tempdir().unwrap();
        write(source.path(), "Assets/Engage_CreatorSDK/Runtime/Loader.cs", "class Loader {}");
        let patterns = vec!["Assets/Engage_CreatorSDK".to_string()];
        // Non-canonical spellings of both the root and the output location.
        let root = source.path().join("Assets/..");
        let output = source
            .path()
            .join("Assets/Engage_CreatorSDK/Runtime/../CreatorSDK.unitypackage");

        let first = export_package(&root, &patterns, &output).unwrap();
        let second = export_package(&root, &patterns, &output).unwrap();
        assert_eq!(first.assets, 1);
        assert_eq!(second.assets, 1);

        let target = tempfile::tempdir().unwrap();
        UnityPackageInstaller::new(target.path())
            .import(&output, true)
            .unwrap();
        assert!(target
            .path()
            .join("Assets/Engage_CreatorSDK/Runtime/Loader.cs")
            .is_file());
        assert!(!target
            .path()
            .join("Assets/Engage_CreatorSDK/CreatorSDK.unitypackage")
            .exists());
    }

    #[test]
    fn empty_selection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_package(
            dir.path(),
            &["Assets/Nothing".to_string()],
            &dir.path().join("out.unitypackage"),
        )
        .unwrap_err();
        assert!(matches!(err, SdkupError::ExportError(_)));
    }
}
