// sdkup/src/cli/init.rs
use clap::Args;
use colored::Colorize;
use sdkup_aio::compute_checksum;
use sdkup_common::config::Config;
use sdkup_common::error::Result;
use sdkup_common::manifest::{Manifest, ManifestStore};
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Turn on automatic updates at startup.
    #[arg(long)]
    pub autoupdate: bool,

    /// Overwrite an existing manifest.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let store = ManifestStore::new(config.manifest_path());
        if store.exists() && !self.force {
            info!(
                "{} already exists. Use --force to re-initialize.",
                store.path().display()
            );
            return Ok(());
        }

        // Record the package already in the project so the first check does
        // not re-import it.
        let artifact = config.artifact_path();
        let last_known_checksum = if artifact.is_file() {
            debug!("Recording checksum of existing {}", artifact.display());
            compute_checksum(&artifact)?
        } else {
            String::new()
        };

        store.provision(
            &Manifest {
                autoupdate_enabled: self.autoupdate,
                last_known_checksum,
            },
            self.force,
        )?;
        println!(
            "{} {}",
            "Created".green().bold(),
            store.path().display()
        );
        Ok(())
    }
}
