// sdkup-core/src/session.rs
use std::path::PathBuf;
use std::time::{Duration, Instant};

use sdkup_common::error::Result;
use sdkup_common::update::UpdatePhase;
use tokio::sync::oneshot;

/// State of one check cycle, owned by the coordinator while it runs.
#[derive(Debug)]
pub struct UpdateSession {
    phase: UpdatePhase,
    history: Vec<UpdatePhase>,
    started: Instant,
    /// Completion of the in-flight download.
    pub(crate) pending: Option<oneshot::Receiver<Result<PathBuf>>>,
}

impl UpdateSession {
    pub(crate) fn new() -> Self {
        Self {
            phase: UpdatePhase::Checking,
            history: vec![UpdatePhase::Checking],
            started: Instant::now(),
            pending: None,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn advance(&mut self, phase: UpdatePhase) {
        tracing::debug!("[Updater] {} -> {}", self.phase, phase);
        self.phase = phase;
        self.history.push(phase);
    }

    pub(crate) fn into_history(self) -> Vec<UpdatePhase> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_phase_history() {
        let mut session = UpdateSession::new();
        session.advance(UpdatePhase::Downloading);
        session.advance(UpdatePhase::Failed);

        assert_eq!(session.phase(), UpdatePhase::Failed);
        assert_eq!(
            session.into_history(),
            vec![
                UpdatePhase::Checking,
                UpdatePhase::Downloading,
                UpdatePhase::Failed
            ]
        );
    }
}
