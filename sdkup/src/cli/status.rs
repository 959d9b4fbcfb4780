// sdkup/src/cli/status.rs
use clap::Args;
use colored::*;
use sdkup_aio::{checksums_match, compute_checksum};
use sdkup_common::config::Config;
use sdkup_common::error::Result;
use sdkup_common::manifest::ManifestStore;
use sdkup_common::update::UpdateStatus;

#[derive(Args, Debug)]
pub struct Status;

/// The line the update window shows for a coordinator status.
pub fn status_message(status: &UpdateStatus) -> String {
    match status {
        UpdateStatus::Idle => "Creator SDK package may not be up to date with latest version."
            .to_string(),
        UpdateStatus::InProgress(_) => {
            "Downloading package from server, this may take several moments...".to_string()
        }
        UpdateStatus::UpToDate => {
            "Creator SDK is already up to date with latest version!".to_string()
        }
        UpdateStatus::Updated => "Creator SDK updated to latest version!".to_string(),
        UpdateStatus::Failed(e) => format!("Update failed ({}): {}", e.kind(), e),
    }
}

pub fn colored_state(status: &UpdateStatus) -> ColoredString {
    let state = status.display_state();
    match status {
        UpdateStatus::Idle => state.dimmed(),
        UpdateStatus::InProgress(_) => state.yellow(),
        UpdateStatus::UpToDate => state.green(),
        UpdateStatus::Updated => state.green().bold(),
        UpdateStatus::Failed(_) => state.red().bold(),
    }
}

pub fn print_status(status: &UpdateStatus) {
    println!("[{}] {}", colored_state(status), status_message(status));
}

impl Status {
    pub fn run(&self, config: &Config) -> Result<()> {
        let store = ManifestStore::new(config.manifest_path());
        println!("{:<20} {}", "Manifest:".bold(), store.path().display());

        let recorded = match store.load() {
            Ok(manifest) => {
                let toggle = if manifest.autoupdate_enabled {
                    "enabled".green()
                } else {
                    "disabled".dimmed()
                };
                println!("{:<20} {}", "Automatic updates:".bold(), toggle);
                println!(
                    "{:<20} {}",
                    "Recorded checksum:".bold(),
                    if manifest.last_known_checksum.is_empty() {
                        "(none)".to_string()
                    } else {
                        manifest.last_known_checksum.clone()
                    }
                );
                Some(manifest.last_known_checksum)
            }
            Err(e) => {
                println!(
                    "{:<20} {} ({})",
                    "Automatic updates:".bold(),
                    "unavailable".red(),
                    e
                );
                None
            }
        };

        let artifact = config.artifact_path();
        if !artifact.is_file() {
            println!("{:<20} {}", "Package:".bold(), "not downloaded".dimmed());
            return Ok(());
        }
        let checksum = compute_checksum(&artifact)?;
        println!("{:<20} {}", "Package:".bold(), artifact.display());
        println!("{:<20} {}", "Package checksum:".bold(), checksum);
        if let Some(recorded) = recorded {
            let state = if checksums_match(&checksum, &recorded) {
                "applied".green()
            } else {
                "not applied".yellow()
            };
            println!("{:<20} {}", "Package state:".bold(), state);
        }
        Ok(())
    }
}
