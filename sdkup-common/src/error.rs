use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SdkupError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Manifest field '{0}' is missing")]
    ManifestFieldMissing(String),

    #[error("Manifest Parse Error: {0}")]
    ManifestParseError(String),

    #[error("Manifest Read Error: {0}")]
    ManifestReadError(String),

    #[error("Manifest Write Error: {0}")]
    ManifestWriteError(String),

    #[error("Fetch Failed: {0}")]
    FetchFailed(String),

    #[error("Apply Failed: {0}")]
    ApplyFailed(String),

    #[error("Export Error: {0}")]
    ExportError(String),

    #[error("Checksum Error: {0}")]
    ChecksumError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("IoError: {0}")]
    IoError(String),
}

impl SdkupError {
    /// Short machine-friendly name of the error kind, used in status output and events.
    pub fn kind(&self) -> &'static str {
        match self {
            SdkupError::Io(_) | SdkupError::IoError(_) => "IoError",
            SdkupError::Http(_) | SdkupError::FetchFailed(_) => "FetchFailed",
            SdkupError::Json(_) | SdkupError::ManifestParseError(_) => "ManifestParseError",
            SdkupError::Config(_) => "ConfigError",
            SdkupError::ManifestFieldMissing(_) => "ManifestFieldMissing",
            SdkupError::ManifestReadError(_) => "ManifestReadError",
            SdkupError::ManifestWriteError(_) => "ManifestWriteError",
            SdkupError::ApplyFailed(_) => "ApplyFailed",
            SdkupError::ExportError(_) => "ExportError",
            SdkupError::ChecksumError(_) => "ChecksumError",
            SdkupError::ValidationError(_) => "ValidationError",
        }
    }
}

impl From<std::io::Error> for SdkupError {
    fn from(err: std::io::Error) -> Self {
        SdkupError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for SdkupError {
    fn from(err: reqwest::Error) -> Self {
        SdkupError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for SdkupError {
    fn from(err: serde_json::Error) -> Self {
        SdkupError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SdkupError>;
