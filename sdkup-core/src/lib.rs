// sdkup-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod coordinator;
pub mod export;
pub mod installer;
mod session;

// Re-export key types for easier use by the CLI crate
pub use coordinator::UpdateCoordinator;
pub use export::{export_package, ExportSummary};
pub use installer::{ImportSummary, PackageInstaller, UnityPackageInstaller};
