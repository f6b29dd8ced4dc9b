//! A unit of work: one remote tile and the local name it is stored under.

use serde::{Deserialize, Serialize};

/// Linux NAME_MAX less room for the `.tif` suffix.
const ID_MAX: usize = 250;

/// Remote URL plus local identifier. The id names both the staging and the
/// ready file, so it must be a single safe path component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub url: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Checks that the id is usable as a file name and the URL is absolute http(s).
    pub fn validate(&self) -> Result<(), String> {
        validate_id(&self.id)?;
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| format!("entry {}: invalid URL {:?}: {}", self.id, self.url, e))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!(
                "entry {}: unsupported URL scheme {:?}",
                self.id, other
            )),
        }
    }
}

/// Rejects ids that would escape the data directory or are not valid Linux file names.
pub fn validate_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("entry id is empty".to_string());
    }
    if id == "." || id == ".." {
        return Err(format!("entry id {:?} is not a file name", id));
    }
    if id.len() > ID_MAX {
        return Err(format!("entry id is longer than {} bytes", ID_MAX));
    }
    if let Some(c) = id
        .chars()
        .find(|c| *c == '/' || *c == '\\' || *c == '\0' || c.is_control())
    {
        return Err(format!("entry id {:?} contains forbidden character {:?}", id, c));
    }
    Ok(())
}
