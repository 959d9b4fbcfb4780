// sdkup-core/src/coordinator.rs
//! Drives one update session at a time:
//! check -> download -> verify -> (up to date | apply) -> persist.
//!
//! The coordinator is owned by the host's main task and driven through
//! `&mut self`. The only work that leaves that task is the download, which
//! runs on a spawned tokio task and reports back over a oneshot channel.

use std::path::PathBuf;
use std::sync::Arc;

use sdkup_aio::{artifact_size, checksums_match, compute_checksum, promote_file};
use sdkup_common::config::Config;
use sdkup_common::error::{Result, SdkupError};
use sdkup_common::manifest::{ManifestStore, AUTOUPDATE_PATH, CHECKSUM_PATH};
use sdkup_common::update::{UpdateEvent, UpdateOutcome, UpdatePhase, UpdateStatus};
use sdkup_net::Fetcher;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, warn};

use crate::installer::PackageInstaller;
use crate::session::UpdateSession;

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct UpdateCoordinator {
    config: Config,
    manifest: ManifestStore,
    fetcher: Arc<dyn Fetcher>,
    installer: Arc<dyn PackageInstaller>,
    autoupdate_enabled: bool,
    startup_error: Option<Arc<SdkupError>>,
    session: Option<UpdateSession>,
    last_outcome: Option<UpdateOutcome>,
    last_history: Vec<UpdatePhase>,
    event_tx: broadcast::Sender<UpdateEvent>,
}

impl UpdateCoordinator {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        let manifest = ManifestStore::new(config.manifest_path());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            manifest,
            fetcher,
            installer,
            autoupdate_enabled: false,
            startup_error: None,
            session: None,
            last_outcome: None,
            last_history: Vec::new(),
            event_tx,
        }
    }

    /// Host startup: begins a check when the manifest enables autoupdate.
    ///
    /// The whole manifest must load: a manifest missing either field only
    /// disables the automatic check. The error is kept for display and
    /// manual checks remain available. Returns whether a session was started.
    pub fn start(&mut self) -> bool {
        match self.manifest.load() {
            Ok(manifest) => {
                self.autoupdate_enabled = manifest.autoupdate_enabled;
                self.startup_error = None;
            }
            Err(e) => {
                warn!("Automatic update disabled, manifest could not be read: {}", e);
                self.autoupdate_enabled = false;
                self.startup_error = Some(Arc::new(e));
                return false;
            }
        }

        if !self.autoupdate_enabled {
            debug!("Automatic updates are disabled in the manifest.");
            return false;
        }
        if self.config.auto_update_suppressed {
            debug!("Auto-update disabled via SDKUP_NO_AUTO_UPDATE=1.");
            return false;
        }
        info!("Automatic updates enabled, checking for a new package.");
        self.trigger_check()
    }

    /// Starts a session unless one is already running. Must be called from
    /// within a tokio runtime. Returns false when a session was already active.
    pub fn trigger_check(&mut self) -> bool {
        if let Some(session) = &self.session {
            debug!(
                "Update check already in progress ({}), ignoring trigger.",
                session.phase()
            );
            return false;
        }

        let url = self.config.package_url.clone();
        let mut session = UpdateSession::new();
        self.emit(UpdateEvent::CheckStarted { url: url.clone() });
        self.emit(UpdateEvent::PhaseChanged {
            phase: UpdatePhase::Checking,
        });

        let (done_tx, done_rx) = oneshot::channel();
        let fetcher = Arc::clone(&self.fetcher);
        let destination = self.config.artifact_download_path();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url, &destination).await;
            if done_tx.send(result).is_err() {
                error!("[Updater] Download finished but the coordinator is gone.");
            }
        });
        session.pending = Some(done_rx);
        self.enter(&mut session, UpdatePhase::Downloading);

        self.session = Some(session);
        true
    }

    /// Non-blocking: completes the session if its download has reported back.
    pub fn pump(&mut self) -> UpdateStatus {
        let received = match self.session.as_mut().and_then(|s| s.pending.as_mut()) {
            Some(done_rx) => match done_rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(Err(download_task_lost())),
            },
            None => None,
        };
        if let Some(result) = received {
            self.finish_download(result);
        }
        self.status()
    }

    /// Waits for the running session, if any, and returns its outcome.
    pub async fn wait(&mut self) -> Option<UpdateOutcome> {
        let result = {
            let done_rx = self.session.as_mut()?.pending.as_mut()?;
            done_rx.await.unwrap_or_else(|_| Err(download_task_lost()))
        };
        self.finish_download(result);
        self.last_outcome.clone()
    }

    /// Flips the autoupdate flag and writes it to the manifest immediately.
    pub fn set_autoupdate(&mut self, enabled: bool) -> Result<()> {
        self.manifest.write_bool(AUTOUPDATE_PATH, enabled)?;
        info!(
            "Automatic updates {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.autoupdate_enabled = enabled;
        self.emit(UpdateEvent::AutoupdateToggled { enabled });
        Ok(())
    }

    pub fn status(&self) -> UpdateStatus {
        if let Some(session) = &self.session {
            return UpdateStatus::InProgress(session.phase());
        }
        match (&self.last_outcome, &self.startup_error) {
            (Some(outcome), _) => UpdateStatus::from(outcome),
            (None, Some(e)) => UpdateStatus::Failed(Arc::clone(e)),
            (None, None) => UpdateStatus::Idle,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.session
            .as_ref()
            .map_or(UpdatePhase::Idle, UpdateSession::phase)
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_some()
    }

    pub fn autoupdate_enabled(&self) -> bool {
        self.autoupdate_enabled
    }

    pub fn startup_error(&self) -> Option<&Arc<SdkupError>> {
        self.startup_error.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&UpdateOutcome> {
        self.last_outcome.as_ref()
    }

    /// Phases the most recently finished session went through.
    pub fn last_session_phases(&self) -> &[UpdatePhase] {
        &self.last_history
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.event_tx.subscribe()
    }

    fn finish_download(&mut self, result: Result<PathBuf>) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.pending = None;

        let outcome = match self.complete(&mut session, result) {
            Ok(outcome) => {
                self.enter(&mut session, UpdatePhase::Done);
                outcome
            }
            Err(e) => {
                error!(
                    "[Updater] Update failed while {}: {}",
                    session.phase(),
                    e
                );
                self.emit(UpdateEvent::session_failed(session.phase(), &e));
                session.advance(UpdatePhase::Failed);
                UpdateOutcome::Failed(Arc::new(e))
            }
        };
        debug!(
            "[Updater] Session finished in {:.1}s",
            session.elapsed().as_secs_f64()
        );

        self.last_outcome = Some(outcome);
        self.last_history = session.into_history();
    }

    fn complete(
        &self,
        session: &mut UpdateSession,
        result: Result<PathBuf>,
    ) -> Result<UpdateOutcome> {
        let downloaded = result?;
        let artifact = self.config.artifact_path();
        promote_file(&downloaded, &artifact)?;
        self.emit(UpdateEvent::DownloadFinished {
            path: artifact.clone(),
            size_bytes: artifact_size(&artifact),
        });

        self.enter(session, UpdatePhase::Verifying);
        let checksum = compute_checksum(&artifact)?;
        let recorded = self.manifest.read_string(CHECKSUM_PATH)?;
        if checksums_match(&checksum, &recorded) {
            info!("Already up to date!");
            self.enter(session, UpdatePhase::UpToDate);
            self.emit(UpdateEvent::PackageUpToDate {
                checksum: checksum.clone(),
            });
            return Ok(UpdateOutcome::UpToDate { checksum });
        }

        self.enter(session, UpdatePhase::Applying);
        info!("Importing updated package");
        self.installer
            .install(&artifact, true)
            .map_err(|e| match e {
                SdkupError::ApplyFailed(_) => e,
                other => SdkupError::ApplyFailed(other.to_string()),
            })?;
        self.manifest.write_string(CHECKSUM_PATH, &checksum)?;
        info!("Creator SDK updated to latest version ({})", checksum);
        self.emit(UpdateEvent::PackageUpdated {
            checksum: checksum.clone(),
        });
        Ok(UpdateOutcome::Updated { checksum })
    }

    fn enter(&self, session: &mut UpdateSession, phase: UpdatePhase) {
        session.advance(phase);
        self.emit(UpdateEvent::PhaseChanged { phase });
    }

    fn emit(&self, event: UpdateEvent) {
        // No subscribers is fine.
        self.event_tx.send(event).ok();
    }
}

fn download_task_lost() -> SdkupError {
    SdkupError::FetchFailed("download task ended without reporting a result".to_string())
}
