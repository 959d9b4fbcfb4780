// sdkup/src/cli/launch.rs
use clap::Args;
use colored::Colorize;
use sdkup_common::config::Config;
use sdkup_common::error::Result;
use sdkup_common::update::UpdateStatus;
use tracing::{debug, error};

use super::build_coordinator;
use super::check::watch_session;

#[derive(Args, Debug)]
pub struct Launch;

impl Launch {
    /// Update failures here are reported but never fail the launch.
    pub async fn run(&self, config: &Config) -> Result<()> {
        let mut coordinator = build_coordinator(config)?;
        if !coordinator.start() {
            if let Some(e) = coordinator.startup_error() {
                eprintln!(
                    "{} Automatic update skipped: {}",
                    "Warning:".yellow(),
                    e
                );
            } else {
                debug!("Skipping automatic update.");
            }
            return Ok(());
        }

        println!("{}{}", "==> ".bold().blue(), "Running auto-update...".bold());
        if let UpdateStatus::Failed(e) = watch_session(&mut coordinator).await {
            error!("Auto-update failed: {}", e);
            eprintln!("{} Auto-update failed: {}", "Warning:".yellow(), e);
        }
        Ok(())
    }
}
