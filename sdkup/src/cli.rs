// sdkup/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use sdkup_common::error::Result;
use sdkup_common::Config;
use sdkup_core::{UnityPackageInstaller, UpdateCoordinator};
use sdkup_net::HttpFetcher;

// Module declarations
pub mod autoupdate;
pub mod check;
pub mod export;
pub mod init;
pub mod launch;
pub mod status;

use crate::cli::autoupdate::AutoupdateArgs;
use crate::cli::check::Check;
use crate::cli::export::ExportArgs;
use crate::cli::init::InitArgs;
use crate::cli::launch::Launch;
use crate::cli::status::Status;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "sdkup", bin_name = "sdkup")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project directory (defaults to SDKUP_PROJECT_ROOT or the current directory).
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the update manifest for this project.
    Init(InitArgs),
    /// Run the startup path: check for updates if automatic updates are enabled.
    Launch(Launch),
    /// Check for updates now.
    Check(Check),
    /// Show the updater state for this project.
    Status(Status),
    /// Enable or disable automatic updates.
    Autoupdate(AutoupdateArgs),
    /// Export project folders as a .unitypackage.
    Export(ExportArgs),
}

impl Command {
    pub async fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Init(command) => command.run(config),
            Self::Launch(command) => command.run(config).await,
            Self::Check(command) => command.run(config).await,
            Self::Status(command) => command.run(config),
            Self::Autoupdate(command) => command.run(config),
            Self::Export(command) => command.run(config),
        }
    }
}

/// Builds the coordinator with the production fetcher and installer.
pub fn build_coordinator(config: &Config) -> Result<UpdateCoordinator> {
    let fetcher = Arc::new(HttpFetcher::new(config)?);
    let installer = Arc::new(UnityPackageInstaller::new(config.project_root()));
    Ok(UpdateCoordinator::new(config.clone(), fetcher, installer))
}
