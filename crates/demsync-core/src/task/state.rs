//! Per-entry state machine.

use std::fmt;

/// Where a fetch-verify-promote task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Staging file opened, request sent.
    Started,
    /// Response headers arrived with a success status.
    ResponseReceived,
    /// Ready file is being digested while the body keeps streaming.
    ComparingCached,
    /// Ready file matched the server digest; the transfer was dropped or its
    /// staged result ignored.
    AbortedCached,
    /// Cache comparison did not match; the transfer runs to completion.
    Downloading,
    /// Body fully written and synced to the staging file.
    TransferEnded,
    /// Staged file is being digested against the server digest.
    VerifyingNew,
    /// Staged file renamed into the ready path.
    Promoted,
    /// Staged file did not verify; nothing promoted.
    VerifyFailed,
    /// Transport, status, staging, promotion, or cancellation failure.
    Failed,
    Done,
}

impl TaskState {
    /// Transition table. `Failed` is reachable from every state that has not
    /// yet resolved; `Done` only from a resolved state.
    pub fn can_advance_to(self, next: TaskState) -> bool {
        use TaskState::*;
        match (self, next) {
            (s, Failed) => !s.is_resolved(),
            (Started, ResponseReceived) => true,
            (ResponseReceived, ComparingCached) => true,
            (ComparingCached, AbortedCached) => true,
            (ComparingCached, Downloading) => true,
            // transfer ended before the cache comparison resolved
            (ComparingCached, TransferEnded) => true,
            (Downloading, TransferEnded) => true,
            (TransferEnded, VerifyingNew) => true,
            (VerifyingNew, Promoted) => true,
            (VerifyingNew, VerifyFailed) => true,
            (s, Done) => s.is_resolved(),
            _ => false,
        }
    }

    /// True once the entry's success or failure is decided.
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            TaskState::AbortedCached
                | TaskState::Promoted
                | TaskState::VerifyFailed
                | TaskState::Failed
                | TaskState::Done
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Started => "started",
            TaskState::ResponseReceived => "response_received",
            TaskState::ComparingCached => "comparing_cached",
            TaskState::AbortedCached => "aborted_cached",
            TaskState::Downloading => "downloading",
            TaskState::TransferEnded => "transfer_ended",
            TaskState::VerifyingNew => "verifying_new",
            TaskState::Promoted => "promoted",
            TaskState::VerifyFailed => "verify_failed",
            TaskState::Failed => "failed",
            TaskState::Done => "done",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::TaskState::*;

    #[test]
    fn cache_hit_path_is_valid() {
        let path = [Started, ResponseReceived, ComparingCached, AbortedCached, Done];
        assert!(path.windows(2).all(|w| w[0].can_advance_to(w[1])));
    }

    #[test]
    fn download_paths_are_valid() {
        let full = [
            Started,
            ResponseReceived,
            ComparingCached,
            Downloading,
            TransferEnded,
            VerifyingNew,
            Promoted,
            Done,
        ];
        assert!(full.windows(2).all(|w| w[0].can_advance_to(w[1])));
        let raced = [ComparingCached, TransferEnded, VerifyingNew, VerifyFailed, Done];
        assert!(raced.windows(2).all(|w| w[0].can_advance_to(w[1])));
    }

    #[test]
    fn resolved_states_do_not_fail_again() {
        assert!(!AbortedCached.can_advance_to(Failed));
        assert!(!Promoted.can_advance_to(Failed));
        assert!(!VerifyFailed.can_advance_to(Failed));
        assert!(Downloading.can_advance_to(Failed));
        assert!(VerifyingNew.can_advance_to(Failed));
    }

    #[test]
    fn cannot_promote_without_verifying() {
        assert!(!TransferEnded.can_advance_to(Promoted));
        assert!(!Downloading.can_advance_to(Promoted));
        assert!(!AbortedCached.can_advance_to(Downloading));
        assert!(!Started.can_advance_to(Done));
    }
}
