// sdkup/src/cli/export.rs
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use sdkup_common::config::{Config, DEFAULT_EXPORT_PATHS};
use sdkup_common::error::Result;
use sdkup_core::export_package;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Paths or globs relative to the project root (defaults to the SDK folders).
    pub paths: Vec<String>,

    /// Output package path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let patterns: Vec<String> = if self.paths.is_empty() {
            DEFAULT_EXPORT_PATHS.iter().map(|s| s.to_string()).collect()
        } else {
            self.paths.clone()
        };
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| config.default_export_path());

        let summary = export_package(config.project_root(), &patterns, &output)?;
        for pattern in &summary.unmatched_patterns {
            eprintln!("{} '{}' matched nothing", "Warning:".yellow(), pattern);
        }
        println!(
            "{} {} assets and {} folders to {}",
            "Exported".green().bold(),
            summary.assets,
            summary.folders,
            summary.output.display()
        );
        Ok(())
    }
}
