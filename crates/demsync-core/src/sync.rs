//! Batch runner: one independent task per entry, all multiplexed on the
//! caller's task. Nothing is spawned, so a `current_thread` runtime runs the
//! whole batch on one thread.

use futures::stream::{FuturesUnordered, Stream};
use tokio_util::sync::CancellationToken;

use crate::entry::Entry;
use crate::layout::DataLayout;
use crate::outcome::{EntryOutcome, EntryStatus};
use crate::task::{FetchTask, TaskOptions};

/// Everything a batch needs, injected by the caller.
#[derive(Debug, Clone)]
pub struct Syncer {
    client: reqwest::Client,
    layout: DataLayout,
    options: TaskOptions,
}

impl Syncer {
    pub fn new(client: reqwest::Client, layout: DataLayout, options: TaskOptions) -> Self {
        Self {
            client,
            layout,
            options,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Run a single entry.
    pub async fn sync_entry(&self, entry: Entry, cancel: &CancellationToken) -> EntryOutcome {
        FetchTask::new(entry, &self.layout)
            .run(&self.client, cancel, self.options)
            .await
    }

    /// Run all entries concurrently and return their outcomes in input order.
    pub async fn sync_all(&self, entries: &[Entry], cancel: &CancellationToken) -> Vec<EntryOutcome> {
        let tasks = entries
            .iter()
            .map(|entry| self.sync_entry(entry.clone(), cancel));
        futures::future::join_all(tasks).await
    }

    /// Run all entries concurrently, yielding each outcome as soon as it resolves.
    pub fn sync_stream<'a>(
        &'a self,
        entries: &'a [Entry],
        cancel: &'a CancellationToken,
    ) -> impl Stream<Item = EntryOutcome> + Unpin + 'a {
        entries
            .iter()
            .map(|entry| self.sync_entry(entry.clone(), cancel))
            .collect::<FuturesUnordered<_>>()
    }
}

/// Tally of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub up_to_date: usize,
    pub updated: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome.status {
            EntryStatus::UpToDate => self.up_to_date += 1,
            EntryStatus::Updated => self.updated += 1,
            EntryStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up_to_date + self.updated + self.failed
    }
}

impl<'a> FromIterator<&'a EntryOutcome> for SyncSummary {
    fn from_iter<I: IntoIterator<Item = &'a EntryOutcome>>(iter: I) -> Self {
        let mut summary = SyncSummary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: EntryStatus) -> EntryOutcome {
        EntryOutcome {
            id: "x".to_string(),
            status,
            detail: String::new(),
            error: None,
            bytes_received: 0,
            states: Vec::new(),
        }
    }

    #[test]
    fn summary_counts_each_status() {
        let outcomes = vec![
            outcome(EntryStatus::Updated),
            outcome(EntryStatus::Failed),
            outcome(EntryStatus::UpToDate),
            outcome(EntryStatus::Updated),
        ];
        let summary: SyncSummary = outcomes.iter().collect();
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.up_to_date, 1);
        assert_eq!(summary.total(), 4);
    }

    #[tokio::test]
    async fn invalid_entry_fails_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let syncer = Syncer::new(
            reqwest::Client::new(),
            DataLayout::new(dir.path()),
            TaskOptions {
                discard_partial_staging: true,
            },
        );
        let cancel = CancellationToken::new();
        let out = syncer
            .sync_entry(Entry::new("../escape", "http://127.0.0.1:1/a.tif"), &cancel)
            .await;
        assert_eq!(out.status, EntryStatus::Failed);
        assert_eq!(out.error.as_ref().map(|e| e.kind()), Some("invalid-entry"));
        assert!(!dir.path().join("downloads").exists());
    }

    #[tokio::test]
    async fn cancelled_batch_resolves_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let syncer = Syncer::new(
            reqwest::Client::new(),
            DataLayout::new(dir.path()),
            TaskOptions::default(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        let entries = vec![
            Entry::new("a", "http://127.0.0.1:1/a.tif"),
            Entry::new("b", "http://127.0.0.1:1/b.tif"),
        ];
        let outcomes = syncer.sync_all(&entries, &cancel).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].id, "a");
        assert_eq!(outcomes[1].id, "b");
        for o in &outcomes {
            assert_eq!(o.error.as_ref().map(|e| e.kind()), Some("cancelled"));
            assert_eq!(o.states.last(), Some(&crate::task::TaskState::Done));
        }
    }
}
