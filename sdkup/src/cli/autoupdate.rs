// sdkup/src/cli/autoupdate.rs
use clap::{Args, ValueEnum};
use colored::Colorize;
use sdkup_common::config::Config;
use sdkup_common::error::Result;

use super::build_coordinator;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct AutoupdateArgs {
    #[arg(value_enum)]
    pub state: Toggle,
}

impl AutoupdateArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let mut coordinator = build_coordinator(config)?;
        let enabled = self.state == Toggle::On;
        coordinator.set_autoupdate(enabled)?;
        if enabled {
            println!("Automatic updates {}", "enabled".green().bold());
        } else {
            println!("Automatic updates {}", "disabled".dimmed());
        }
        Ok(())
    }
}
