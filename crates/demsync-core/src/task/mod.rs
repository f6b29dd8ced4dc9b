//! Fetch-verify-promote for a single entry.
//!
//! The GET is streamed into the staging file while, once headers arrive, the
//! existing ready file is digested and compared to the server's `Content-MD5`.
//! The two futures race: if the cached copy matches first, the transfer
//! future is dropped (closing the connection) and the entry is up to date.
//! Otherwise the transfer completes, the staged file is verified against the
//! same digest, and only then renamed into the ready path. Cancellation is
//! observed up to verification; a verified file is always promoted.

mod state;
mod transfer;

pub use state::TaskState;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::digest::{self, Comparison};
use crate::entry::Entry;
use crate::error::SyncError;
use crate::layout::DataLayout;
use crate::outcome::{EntryOutcome, EntryStatus};
use crate::storage::{self, StagingWriter};

/// Per-task knobs that do not belong to the HTTP client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOptions {
    /// Remove the staging file of any entry that did not promote.
    pub discard_partial_staging: bool,
}

/// Where the cancellable part of a task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetched {
    UpToDate,
    /// Staged file matches the server digest and waits for promotion.
    Verified,
}

/// How a successful task resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    UpToDate,
    Updated,
}

/// One entry's task. Owns its state and the paths for its id; no other task
/// touches those paths.
pub struct FetchTask {
    entry: Entry,
    staging_path: PathBuf,
    ready_path: PathBuf,
    state: TaskState,
    trace: Vec<TaskState>,
}

impl FetchTask {
    pub fn new(entry: Entry, layout: &DataLayout) -> Self {
        let staging_path = layout.staging_path(&entry.id);
        let ready_path = layout.ready_path(&entry.id);
        Self {
            entry,
            staging_path,
            ready_path,
            state: TaskState::Started,
            trace: vec![TaskState::Started],
        }
    }

    fn advance(&mut self, next: TaskState) {
        let allowed = self.state.can_advance_to(next);
        debug_assert!(allowed, "invalid transition {} -> {}", self.state, next);
        if !allowed {
            warn!(id = %self.entry.id, from = %self.state, to = %next, "unexpected state transition");
        }
        debug!(id = %self.entry.id, from = %self.state, to = %next, "state");
        self.state = next;
        self.trace.push(next);
    }

    /// Run the task to completion. Always resolves exactly once; errors are
    /// reported in the outcome, never propagated.
    pub async fn run(
        mut self,
        client: &reqwest::Client,
        cancel: &CancellationToken,
        options: TaskOptions,
    ) -> EntryOutcome {
        let received = AtomicU64::new(0);
        let valid = self.entry.validate().map_err(SyncError::InvalidEntry);

        let result = match valid {
            Err(e) => Err(e),
            Ok(()) => {
                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SyncError::Cancelled),
                    r = self.drive(client, &received) => r,
                };
                match fetched {
                    Ok(Fetched::UpToDate) => Ok(Resolution::UpToDate),
                    // not raced against `cancel`: the rename cannot be taken back
                    Ok(Fetched::Verified) => self.promote().await,
                    Err(e) => Err(e),
                }
            }
        };

        let id = self.entry.id.clone();
        let bytes_received = received.load(Ordering::Relaxed);
        let (status, detail, error) = match result {
            Ok(Resolution::UpToDate) => {
                info!(id = %id, "local DEM data was already up to date");
                (
                    EntryStatus::UpToDate,
                    "local copy already up to date".to_string(),
                    None,
                )
            }
            Ok(Resolution::Updated) => {
                info!(id = %id, path = %self.ready_path.display(), bytes = bytes_received, "DEM data updated");
                (
                    EntryStatus::Updated,
                    format!("updated {}", self.ready_path.display()),
                    None,
                )
            }
            Err(e) => {
                if !self.state.is_resolved() {
                    self.advance(TaskState::Failed);
                }
                warn!(id = %id, url = %self.entry.url, error = %e, "failed to update DEM data");
                (EntryStatus::Failed, e.to_string(), Some(e))
            }
        };

        let invalid = matches!(error, Some(SyncError::InvalidEntry(_)));
        if options.discard_partial_staging && status != EntryStatus::Updated && !invalid {
            if let Err(e) = storage::discard(&self.staging_path).await {
                warn!(id = %id, path = %self.staging_path.display(), error = %e, "could not remove staging file");
            }
        }

        self.advance(TaskState::Done);
        EntryOutcome {
            id,
            status,
            detail,
            error,
            bytes_received,
            states: self.trace,
        }
    }

    async fn drive(
        &mut self,
        client: &reqwest::Client,
        received: &AtomicU64,
    ) -> Result<Fetched, SyncError> {
        // The staging stream is opened before the request goes out.
        let staging = StagingWriter::create(&self.staging_path)
            .await
            .map_err(SyncError::Staging)?;

        let response = client
            .get(&self.entry.url)
            .send()
            .await
            .map_err(SyncError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
            });
        }
        self.advance(TaskState::ResponseReceived);

        let expected = transfer::content_md5(response.headers(), &self.entry.id);
        self.advance(TaskState::ComparingCached);

        let written = {
            let ready_path = self.ready_path.clone();
            let cache_check = digest::compare_file(&ready_path, expected.as_ref());
            let body = transfer::stream_body(response, staging, received);
            tokio::pin!(cache_check);
            tokio::pin!(body);

            tokio::select! {
                comparison = &mut cache_check => {
                    match comparison {
                        Comparison::Match => {
                            // Dropping `body` cancels the transfer; nothing it
                            // does afterwards can be observed.
                            self.advance(TaskState::AbortedCached);
                            return Ok(Fetched::UpToDate);
                        }
                        Comparison::Mismatch { computed } => {
                            info!(
                                id = %self.entry.id,
                                url = %self.entry.url,
                                local = %computed,
                                "remote hash differs from local copy, downloading new DEM data"
                            );
                        }
                        Comparison::ReadFailure(e) => {
                            info!(
                                id = %self.entry.id,
                                url = %self.entry.url,
                                error = %e,
                                "no readable local copy, downloading new DEM data"
                            );
                        }
                    }
                    self.advance(TaskState::Downloading);
                    body.await?
                }
                written = &mut body => {
                    debug!(id = %self.entry.id, "transfer ended before cache comparison");
                    // A matching ready file still wins over the staged copy.
                    if cache_check.await.is_match() {
                        self.advance(TaskState::AbortedCached);
                        return Ok(Fetched::UpToDate);
                    }
                    written?
                }
            }
        };

        self.advance(TaskState::TransferEnded);
        debug!(id = %self.entry.id, bytes = written, path = %self.staging_path.display(), "download complete");

        self.advance(TaskState::VerifyingNew);
        match digest::compare_file(&self.staging_path, expected.as_ref()).await {
            Comparison::Match => {}
            Comparison::Mismatch { computed } => {
                self.advance(TaskState::VerifyFailed);
                return Err(SyncError::DigestMismatch { expected, computed });
            }
            Comparison::ReadFailure(e) => {
                self.advance(TaskState::VerifyFailed);
                return Err(SyncError::LocalReadFailure(e));
            }
        }

        Ok(Fetched::Verified)
    }

    async fn promote(&mut self) -> Result<Resolution, SyncError> {
        storage::promote(&self.staging_path, &self.ready_path).await?;
        self.advance(TaskState::Promoted);
        Ok(Resolution::Updated)
    }
}
