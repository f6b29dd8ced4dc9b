//! Structured per-entry result; presentation is left to the caller.

use std::fmt;

use crate::error::SyncError;
use crate::task::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Ready file already matched the server digest; nothing changed on disk.
    UpToDate,
    /// A new file was downloaded, verified, and promoted.
    Updated,
    Failed,
}

impl EntryStatus {
    pub fn is_success(self) -> bool {
        !matches!(self, EntryStatus::Failed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryStatus::UpToDate => "up-to-date",
            EntryStatus::Updated => "updated",
            EntryStatus::Failed => "failed",
        })
    }
}

/// What happened to one entry.
#[derive(Debug)]
pub struct EntryOutcome {
    pub id: String,
    pub status: EntryStatus,
    /// Human-readable summary (the error text on failure).
    pub detail: String,
    pub error: Option<SyncError>,
    /// Body bytes received before the transfer ended or was dropped.
    pub bytes_received: u64,
    /// States visited, in order, ending with `Done`.
    pub states: Vec<TaskState>,
}

impl EntryOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// True if the task went through `state` at some point.
    pub fn visited(&self, state: TaskState) -> bool {
        self.states.contains(&state)
    }
}
