//! Sequential writer for a staging download file.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

const WRITE_BUF_SIZE: usize = 64 * 1024;

/// Buffered writer owning one staging file for the lifetime of a transfer.
pub struct StagingWriter {
    file: BufWriter<tokio::fs::File>,
    path: PathBuf,
    written: u64,
}

impl StagingWriter {
    /// Create (or truncate) the staging file, creating its directory if needed.
    pub async fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        Ok(Self {
            file: BufWriter::with_capacity(WRITE_BUF_SIZE, file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Append one chunk of the response body.
    pub async fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data).await?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered data and sync it to disk, closing the file.
    /// Must complete before the staged file is digested or promoted.
    pub async fn finish(mut self) -> io::Result<u64> {
        self.file.flush().await?;
        self.file.get_ref().sync_all().await?;
        Ok(self.written)
    }
}
