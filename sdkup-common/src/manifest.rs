// sdkup-common/src/manifest.rs
//! Path-addressed access to the local update manifest.
//!
//! The manifest is a small JSON tree. Fields are addressed by `/`-separated
//! paths such as `packageData/checksum`, and every write persists the whole
//! document before returning.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::error::{Result, SdkupError};

pub const AUTOUPDATE_PATH: &str = "packageData/autoupdate";
pub const CHECKSUM_PATH: &str = "packageData/checksum";

/// Typed snapshot of the two fields the updater relies on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub autoupdate_enabled: bool,
    pub last_known_checksum: String,
}

#[derive(Serialize, Deserialize)]
struct ManifestDocument {
    #[serde(rename = "packageData")]
    package_data: PackageData,
}

#[derive(Serialize, Deserialize)]
struct PackageData {
    autoupdate: bool,
    checksum: String,
}

#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Creates the manifest with both fields. An existing manifest is left
    /// alone unless `force` is set.
    pub fn provision(&self, manifest: &Manifest, force: bool) -> Result<()> {
        if self.exists() && !force {
            return Err(SdkupError::ManifestWriteError(format!(
                "{} already exists",
                self.path.display()
            )));
        }
        let document = ManifestDocument {
            package_data: PackageData {
                autoupdate: manifest.autoupdate_enabled,
                checksum: manifest.last_known_checksum.clone(),
            },
        };
        let value = serde_json::to_value(&document)?;
        debug!("Provisioning manifest at {}", self.path.display());
        self.persist(&value)
    }

    pub fn load(&self) -> Result<Manifest> {
        let document = self.load_document()?;
        Ok(Manifest {
            autoupdate_enabled: bool_field(&document, AUTOUPDATE_PATH)?,
            last_known_checksum: string_field(&document, CHECKSUM_PATH)?,
        })
    }

    pub fn read_bool(&self, path: &str) -> Result<bool> {
        bool_field(&self.load_document()?, path)
    }

    pub fn read_string(&self, path: &str) -> Result<String> {
        string_field(&self.load_document()?, path)
    }

    pub fn write_bool(&self, path: &str, value: bool) -> Result<()> {
        self.write_value(path, Value::Bool(value))
    }

    pub fn write_string(&self, path: &str, value: &str) -> Result<()> {
        self.write_value(path, Value::String(value.to_string()))
    }

    fn write_value(&self, path: &str, value: Value) -> Result<()> {
        let mut document = self.load_document()?;
        let slot = resolve_mut(&mut document, path)
            .ok_or_else(|| SdkupError::ManifestFieldMissing(path.to_string()))?;
        if slot.is_object() || slot.is_array() {
            return Err(SdkupError::ManifestParseError(format!(
                "Field '{path}' is not a scalar value"
            )));
        }
        debug!("Writing manifest field {} = {}", path, value);
        *slot = value;
        self.persist(&document)
    }

    fn load_document(&self) -> Result<Value> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            SdkupError::ManifestReadError(format!(
                "Failed to read manifest {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|e| {
            SdkupError::ManifestParseError(format!(
                "{} is not well-formed JSON: {}",
                self.path.display(),
                e
            ))
        })?;
        if !document.is_object() {
            return Err(SdkupError::ManifestParseError(format!(
                "{} does not contain a JSON object at the top level",
                self.path.display()
            )));
        }
        Ok(document)
    }

    /// Writes the document through a temp file in the same directory and
    /// renames it over the manifest.
    fn persist(&self, document: &Value) -> Result<()> {
        let write_err = |e: io::Error| {
            error!("Failed to persist manifest {}: {}", self.path.display(), e);
            SdkupError::ManifestWriteError(format!(
                "Failed to write manifest {}: {}",
                self.path.display(),
                e
            ))
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let mut bytes = serde_json::to_vec_pretty(document)?;
        bytes.push(b'\n');

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp_file.write_all(&bytes).map_err(write_err)?;
        temp_file.flush().map_err(write_err)?;
        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(document, |node, key| node.as_object()?.get(key))
}

fn resolve_mut<'a>(document: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    segments(path).try_fold(document, |node, key| node.as_object_mut()?.get_mut(key))
}

fn bool_field(document: &Value, path: &str) -> Result<bool> {
    match resolve(document, path) {
        None => Err(SdkupError::ManifestFieldMissing(path.to_string())),
        Some(Value::Bool(b)) => Ok(*b),
        // Hand-edited manifests carry "True"/"False" strings.
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(SdkupError::ManifestParseError(format!(
            "Field '{path}' is not a boolean: {other}"
        ))),
    }
}

fn string_field(document: &Value, path: &str) -> Result<String> {
    match resolve(document, path) {
        None => Err(SdkupError::ManifestFieldMissing(path.to_string())),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SdkupError::ManifestParseError(format!(
            "Field '{path}' is not a string: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(contents: &str) -> (tempfile::TempDir, ManifestStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, contents).unwrap();
        (dir, ManifestStore::new(path))
    }

    #[test]
    fn reads_fields_by_path() {
        let (_dir, store) =
            store_with(r#"{"packageData": {"autoupdate": true, "checksum": "abc123"}}"#);
        assert!(store.read_bool(AUTOUPDATE_PATH).unwrap());
        assert_eq!(store.read_string(CHECKSUM_PATH).unwrap(), "abc123");
        assert_eq!(
            store.load().unwrap(),
            Manifest {
                autoupdate_enabled: true,
                last_known_checksum: "abc123".to_string(),
            }
        );
    }

    #[test]
    fn accepts_string_booleans() {
        let (_dir, store) =
            store_with(r#"{"packageData": {"autoupdate": "False", "checksum": ""}}"#);
        assert!(!store.read_bool(AUTOUPDATE_PATH).unwrap());
    }

    #[test]
    fn missing_field_is_an_error() {
        let (_dir, store) = store_with(r#"{"packageData": {"autoupdate": false}}"#);
        let err = store.read_string(CHECKSUM_PATH).unwrap_err();
        assert!(matches!(err, SdkupError::ManifestFieldMissing(p) if p == CHECKSUM_PATH));
        assert!(matches!(
            store.load(),
            Err(SdkupError::ManifestFieldMissing(_))
        ));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let (_dir, store) = store_with("<packageData><checksum>abc</checksum>");
        assert!(matches!(
            store.read_bool(AUTOUPDATE_PATH),
            Err(SdkupError::ManifestParseError(_))
        ));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let (_dir, store) =
            store_with(r#"{"packageData": {"autoupdate": 1, "checksum": "abc"}}"#);
        assert!(matches!(
            store.read_bool(AUTOUPDATE_PATH),
            Err(SdkupError::ManifestParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        assert!(matches!(
            store.read_bool(AUTOUPDATE_PATH),
            Err(SdkupError::ManifestReadError(_))
        ));
    }

    #[test]
    fn writes_persist_and_keep_other_fields() {
        let (_dir, store) = store_with(
            r#"{"packageData": {"autoupdate": false, "checksum": "abc123", "channel": "stable"}}"#,
        );
        store.write_string(CHECKSUM_PATH, "def456").unwrap();
        store.write_bool(AUTOUPDATE_PATH, true).unwrap();

        let fresh = ManifestStore::new(store.path());
        assert_eq!(fresh.read_string(CHECKSUM_PATH).unwrap(), "def456");
        assert!(fresh.read_bool(AUTOUPDATE_PATH).unwrap());
        assert_eq!(fresh.read_string("packageData/channel").unwrap(), "stable");
    }

    #[test]
    fn write_to_missing_field_leaves_file_untouched() {
        let original = r#"{"packageData": {"autoupdate": false}}"#;
        let (_dir, store) = store_with(original);
        let err = store.write_string(CHECKSUM_PATH, "def456").unwrap_err();
        assert!(matches!(err, SdkupError::ManifestFieldMissing(_)));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
    }

    #[test]
    fn write_over_a_section_is_rejected() {
        let original = r#"{"packageData": {"autoupdate": false, "checksum": "abc"}}"#;
        let (_dir, store) = store_with(original);
        let err = store.write_bool("packageData", true).unwrap_err();
        assert!(matches!(err, SdkupError::ManifestParseError(_)));
        assert!(matches!(
            store.write_string("", "abc"),
            Err(SdkupError::ManifestParseError(_))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
    }

    #[test]
    fn provision_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        let manifest = Manifest {
            autoupdate_enabled: false,
            last_known_checksum: String::new(),
        };
        store.provision(&manifest, false).unwrap();
        assert_eq!(store.load().unwrap(), manifest);

        store.write_string(CHECKSUM_PATH, "abc123").unwrap();
        assert!(store.provision(&manifest, false).is_err());
        assert_eq!(store.read_string(CHECKSUM_PATH).unwrap(), "abc123");

        store.provision(&manifest, true).unwrap();
        assert_eq!(store.read_string(CHECKSUM_PATH).unwrap(), "");
    }
}
