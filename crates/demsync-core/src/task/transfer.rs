//! Streaming the response body into the staging file.

use futures::StreamExt;
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::digest::ContentDigest;
use crate::error::SyncError;
use crate::storage::StagingWriter;

const CONTENT_MD5: &str = "content-md5";

/// Server-advertised digest, if the `Content-MD5` header is present and well formed.
pub(super) fn content_md5(headers: &HeaderMap, id: &str) -> Option<ContentDigest> {
    let Some(value) = headers.get(CONTENT_MD5) else {
        tracing::warn!(id, "response has no Content-MD5 header; digests cannot match");
        return None;
    };
    let digest = value.to_str().ok().and_then(ContentDigest::parse);
    if digest.is_none() {
        tracing::warn!(id, value = ?value, "ignoring malformed Content-MD5 header");
    }
    digest
}

/// Write the whole body to `staging`, then flush and sync it.
/// `received` counts body bytes as they arrive so the caller can report
/// progress even when this future is dropped mid-transfer.
pub(super) async fn stream_body(
    response: reqwest::Response,
    mut staging: StagingWriter,
    received: &AtomicU64,
) -> Result<u64, SyncError> {
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(SyncError::Transport)?;
        received.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        staging
            .write_chunk(&chunk)
            .await
            .map_err(SyncError::Staging)?;
    }
    tracing::trace!(path = %staging.path().display(), "body complete, syncing staging file");
    staging.finish().await.map_err(SyncError::Staging)
}
