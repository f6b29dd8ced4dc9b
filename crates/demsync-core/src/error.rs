//! Per-entry failure kinds.

use std::io;
use std::path::PathBuf;

use crate::digest::ContentDigest;

/// Why a single entry failed. Never aborts the batch; each variant ends up in
/// that entry's [`EntryOutcome`](crate::outcome::EntryOutcome).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Connection, timeout, or body read failure during the transfer.
    #[error("transport: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// The fully downloaded bytes do not match what the server advertised.
    #[error("downloaded digest {computed} does not match {}", display_expected(.expected))]
    DigestMismatch {
        expected: Option<ContentDigest>,
        computed: ContentDigest,
    },

    /// The just-written staging file could not be read back.
    #[error("read staged file: {0}")]
    LocalReadFailure(#[source] io::Error),

    /// The staging file could not be created, written, or synced.
    #[error("staging: {0}")]
    Staging(#[source] io::Error),

    /// Rename from staging to ready failed; the staged file is left behind.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Promotion {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// The batch was cancelled before this entry resolved.
    #[error("cancelled")]
    Cancelled,
}

fn display_expected(expected: &Option<ContentDigest>) -> String {
    match expected {
        Some(d) => d.to_string(),
        None => "(no Content-MD5 header)".to_string(),
    }
}

impl SyncError {
    /// Short stable label for status output.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Transport(_) => "transport",
            SyncError::HttpStatus { .. } => "http-status",
            SyncError::DigestMismatch { .. } => "digest-mismatch",
            SyncError::LocalReadFailure(_) => "local-read",
            SyncError::Staging(_) => "staging",
            SyncError::Promotion { .. } => "promotion",
            SyncError::InvalidEntry(_) => "invalid-entry",
            SyncError::Cancelled => "cancelled",
        }
    }
}
