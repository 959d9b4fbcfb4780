// sdkup/src/cli/check.rs
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sdkup_common::config::Config;
use sdkup_common::error::Result;
use sdkup_common::update::{UpdateEvent, UpdateStatus};
use sdkup_core::UpdateCoordinator;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::debug;

use super::build_coordinator;
use super::status::{print_status, status_message};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args, Debug)]
pub struct Check;

impl Check {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let mut coordinator = build_coordinator(config)?;
        check_now(&mut coordinator).await
    }
}

/// The manual "check now" action; the launch-time manifest gate does not apply.
pub async fn check_now(coordinator: &mut UpdateCoordinator) -> Result<()> {
    if !coordinator.trigger_check() {
        debug!("Update check already running, following it.");
    }
    match watch_session(coordinator).await {
        UpdateStatus::Failed(e) => Err((*e).clone()),
        _ => Ok(()),
    }
}

/// Polls the coordinator until its session finishes, showing a spinner.
pub async fn watch_session(coordinator: &mut UpdateCoordinator) -> UpdateStatus {
    let mut events = coordinator.subscribe();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(POLL_INTERVAL);
    spinner.set_message(status_message(&coordinator.status()));

    let mut status = coordinator.pump();
    while coordinator.is_busy() {
        loop {
            match events.try_recv() {
                Ok(event) => {
                    if let Some(message) = event_message(&event) {
                        spinner.set_message(message);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!("Missed {} update events", skipped);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
        status = coordinator.pump();
    }
    spinner.finish_and_clear();

    print_status(&status);
    status
}

fn event_message(event: &UpdateEvent) -> Option<String> {
    match event {
        UpdateEvent::CheckStarted { url } => Some(format!("Checking {url}")),
        UpdateEvent::DownloadFinished { size_bytes, .. } => {
            Some(format!("Downloaded {size_bytes} bytes, verifying..."))
        }
        UpdateEvent::PhaseChanged { phase } => Some(format!("{phase}...")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sdkup_common::error::SdkupError;

    use super::*;

    #[tokio::test]
    async fn manual_check_ignores_startup_manifest_gate() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_project(dir.path());
        config.package_url = "ftp://example.com/CreatorSDK.unitypackage".to_string();
        fs::write(config.manifest_path(), "{ not json").unwrap();
        let mut coordinator = build_coordinator(&config).unwrap();

        let err = check_now(&mut coordinator).await.unwrap_err();

        assert!(matches!(err, SdkupError::ValidationError(_)));
        assert!(coordinator.startup_error().is_none());
        assert!(!coordinator.is_busy());
    }
}
