//! Staging files and promotion.
//!
//! A transfer streams into a staging file that is flushed and synced before
//! it is verified; promotion is an atomic rename from the staging path to the
//! ready path (both under the same data root, so the same filesystem).

mod writer;

pub use writer::StagingWriter;

use std::io;
use std::path::Path;

use crate::error::SyncError;

/// Atomically rename a verified staging file into `ready_path`, replacing any
/// previous ready file. Creates the ready directory if needed. On failure the
/// staging file is left where it is.
pub async fn promote(staging_path: &Path, ready_path: &Path) -> Result<(), SyncError> {
    let promotion_error = |source: io::Error| SyncError::Promotion {
        from: staging_path.to_path_buf(),
        to: ready_path.to_path_buf(),
        source,
    };
    if let Some(parent) = ready_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(promotion_error)?;
    }
    tokio::fs::rename(staging_path, ready_path)
        .await
        .map_err(promotion_error)
}

/// Remove a staging file left behind by an entry that did not promote.
/// A file that is already gone is not an error.
pub async fn discard(staging_path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(staging_path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
