// sdkup-common/src/update.rs
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SdkupError;

/// Phases of one update session, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatePhase {
    Idle,
    Checking,
    Downloading,
    Verifying,
    UpToDate,
    Applying,
    Done,
    Failed,
}

impl UpdatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatePhase::Idle => "idle",
            UpdatePhase::Checking => "checking",
            UpdatePhase::Downloading => "downloading",
            UpdatePhase::Verifying => "verifying",
            UpdatePhase::UpToDate => "up-to-date",
            UpdatePhase::Applying => "applying",
            UpdatePhase::Done => "done",
            UpdatePhase::Failed => "failed",
        }
    }
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished session ended.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The downloaded package matched the recorded checksum.
    UpToDate { checksum: String },
    /// The package was imported and its checksum recorded.
    Updated { checksum: String },
    Failed(Arc<SdkupError>),
}

/// What the presentation layer shows.
#[derive(Debug, Clone)]
pub enum UpdateStatus {
    Idle,
    /// A session is running; carries its current phase.
    InProgress(UpdatePhase),
    UpToDate,
    Updated,
    Failed(Arc<SdkupError>),
}

impl UpdateStatus {
    pub fn display_state(&self) -> &'static str {
        match self {
            UpdateStatus::Idle => "idle",
            UpdateStatus::InProgress(UpdatePhase::Verifying | UpdatePhase::Applying) => {
                "updating"
            }
            UpdateStatus::InProgress(_) => "downloading",
            UpdateStatus::UpToDate => "up to date",
            UpdateStatus::Updated => "updated",
            UpdateStatus::Failed(_) => "error",
        }
    }
}

impl From<&UpdateOutcome> for UpdateStatus {
    fn from(outcome: &UpdateOutcome) -> Self {
        match outcome {
            UpdateOutcome::UpToDate { .. } => UpdateStatus::UpToDate,
            UpdateOutcome::Updated { .. } => UpdateStatus::Updated,
            UpdateOutcome::Failed(e) => UpdateStatus::Failed(Arc::clone(e)),
        }
    }
}

/// Broadcast by the coordinator as a session progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdateEvent {
    CheckStarted {
        url: String,
    },
    PhaseChanged {
        phase: UpdatePhase,
    },
    DownloadFinished {
        path: PathBuf,
        size_bytes: u64,
    },
    PackageUpToDate {
        checksum: String,
    },
    PackageUpdated {
        checksum: String,
    },
    SessionFailed {
        phase: UpdatePhase,
        kind: String,
        error: String, // Keep as String for simplicity in events
    },
    AutoupdateToggled {
        enabled: bool,
    },
}

impl UpdateEvent {
    pub fn session_failed(phase: UpdatePhase, error: &SdkupError) -> Self {
        UpdateEvent::SessionFailed {
            phase,
            kind: error.kind().to_string(),
            error: error.to_string(),
        }
    }
}
