//! Checksum command: base64 MD5 of a file.

use anyhow::{Context, Result};
use demsync_core::digest;
use std::path::Path;

/// Compute and print the base64 MD5 of the given file.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = digest::md5_base64_path(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
