//! Content-MD5 digests: base64-encoded MD5 over a byte stream.
//!
//! Files are read in fixed-size chunks with non-blocking I/O so that a digest
//! of a large tile can run alongside an in-flight transfer on the same thread.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};
use std::fmt;
use std::io;
use std::path::Path;
use tokio::io::AsyncReadExt;

const BUF_SIZE: usize = 64 * 1024;

/// Length of a raw MD5 digest in bytes.
const MD5_LEN: usize = 16;

/// A base64-encoded MD5 digest, as carried by the `Content-MD5` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Parses a header value. Returns `None` unless it is valid base64 of exactly 16 bytes.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let raw = STANDARD.decode(value).ok()?;
        if raw.len() != MD5_LEN {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Digest of an in-memory buffer.
    pub fn compute(bytes: &[u8]) -> Self {
        Self::from_hasher(Md5::new_with_prefix(bytes))
    }

    fn from_hasher(hasher: Md5) -> Self {
        Self(STANDARD.encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of comparing a local file against a reference digest.
///
/// The three cases drive different control paths: a cache match cancels the
/// transfer, a cache mismatch or missing cache lets it continue, and after a
/// download anything but a match blocks promotion.
#[derive(Debug)]
pub enum Comparison {
    /// The file was read fully and its digest equals the reference.
    Match,
    /// The file was read fully but its digest differs (or there was no reference).
    Mismatch { computed: ContentDigest },
    /// The file could not be opened or read (e.g. it does not exist yet).
    ReadFailure(io::Error),
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

/// Compute the base64 MD5 of a file, reading it in chunks.
pub async fn md5_base64_path(path: &Path) -> io::Result<ContentDigest> {
    let mut f = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentDigest::from_hasher(hasher))
}

/// Digest `path` and compare it to `reference`.
///
/// With no reference a readable file always compares as a mismatch. Never
/// modifies the file.
pub async fn compare_file(path: &Path, reference: Option<&ContentDigest>) -> Comparison {
    match md5_base64_path(path).await {
        Err(e) => Comparison::ReadFailure(e),
        Ok(computed) if reference == Some(&computed) => Comparison::Match,
        Ok(computed) => Comparison::Mismatch { computed },
    }
}
