// sdkup-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::error::{Result, SdkupError};

pub const DEFAULT_PACKAGE_URL: &str =
    "https://github.com/immersivevreducation/Engage_CreatorSDK/blob/master/CreatorSDK.unitypackage?raw=true";
const MANIFEST_FILENAME: &str = "manifest.json";
const ARTIFACT_FILENAME: &str = "CreatorSDK.unitypackage";
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Directories and files bundled by `sdkup export` when no paths are given.
pub const DEFAULT_EXPORT_PATHS: &[&str] = &[
    "Assets/Editor",
    "Assets/Engage_CreatorSDK",
    "Assets/Standard Assets",
    "ProjectSettings/TagManager.asset",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub package_url: String,
    pub download_timeout: Duration,
    pub connect_timeout: Duration,
    /// Set by `SDKUP_NO_AUTO_UPDATE=1`; suppresses the update-on-launch path only.
    pub auto_update_suppressed: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading sdkup configuration");

        let project_root = match env::var("SDKUP_PROJECT_ROOT").ok().filter(|s| !s.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => {
                let cwd = env::current_dir().map_err(|e| {
                    SdkupError::Config(format!("Could not determine current directory: {e}"))
                })?;
                debug!(
                    "SDKUP_PROJECT_ROOT not set or empty, using current directory: {}",
                    cwd.display()
                );
                cwd
            }
        };

        let mut config = Self::for_project(project_root);

        if let Some(url) = env::var("SDKUP_PACKAGE_URL").ok().filter(|s| !s.is_empty()) {
            debug!("Package URL overridden via SDKUP_PACKAGE_URL: {}", url);
            config.package_url = url;
        }

        if let Ok(raw) = env::var("SDKUP_DOWNLOAD_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                SdkupError::Config(format!(
                    "SDKUP_DOWNLOAD_TIMEOUT_SECS must be a whole number of seconds, got '{raw}': {e}"
                ))
            })?;
            config.download_timeout = Duration::from_secs(secs);
        }

        config.auto_update_suppressed = env::var("SDKUP_NO_AUTO_UPDATE").is_ok_and(|v| v == "1");

        debug!(
            "Configuration loaded successfully (project root: {}).",
            config.project_root.display()
        );
        Ok(config)
    }

    /// Configuration with default settings rooted at `project_root`, ignoring the environment.
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            package_url: DEFAULT_PACKAGE_URL.to_string(),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            auto_update_suppressed: false,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_FILENAME)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.project_root.join(ARTIFACT_FILENAME)
    }

    /// Temporary location a download is written to before it replaces the artifact.
    pub fn artifact_download_path(&self) -> PathBuf {
        self.project_root.join(format!(".{ARTIFACT_FILENAME}.download"))
    }

    pub fn default_export_path(&self) -> PathBuf {
        self.project_root.join(ARTIFACT_FILENAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.project_root.join("Logs").join("sdkup")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_paths_are_rooted() {
        let config = Config::for_project("/work/project");
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("/work/project/manifest.json")
        );
        assert_eq!(
            config.artifact_path(),
            PathBuf::from("/work/project/CreatorSDK.unitypackage")
        );
        assert_eq!(
            config.artifact_download_path(),
            PathBuf::from("/work/project/.CreatorSDK.unitypackage.download")
        );
        assert_eq!(config.package_url, DEFAULT_PACKAGE_URL);
        assert!(!config.auto_update_suppressed);
    }
}
