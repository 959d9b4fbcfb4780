// sdkup-common/src/lib.rs
pub mod config;
pub mod error;
pub mod manifest;
pub mod update;

// Re-export key types
pub use config::Config;
pub use error::{Result, SdkupError};
pub use manifest::{Manifest, ManifestStore};
pub use update::{UpdateEvent, UpdateOutcome, UpdatePhase, UpdateStatus};
