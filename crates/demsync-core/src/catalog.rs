//! Catalog of entries to sync, read from a TOML file:
//!
//! ```toml
//! [[entries]]
//! id = "N60E024"
//! url = "https://example.blob.core.windows.net/dem/N60E024.tif"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::entry::Entry;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
    /// Two entries would share staging and ready paths.
    #[error("duplicate entry id {0:?}")]
    DuplicateId(String),
    #[error("no catalog entry with id {0:?}")]
    UnknownId(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Catalog {
    /// Parse and validate.
    pub fn from_toml_str(data: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Every entry must be valid and ids must be unique.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for (index, entry) in self.entries.iter().enumerate() {
            entry
                .validate()
                .map_err(|reason| CatalogError::InvalidEntry { index, reason })?;
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(())
    }

    /// Entries whose id is in `only`, in catalog order; all entries if `only` is empty.
    pub fn select(&self, only: &[String]) -> Result<Vec<Entry>, CatalogError> {
        if only.is_empty() {
            return Ok(self.entries.clone());
        }
        if let Some(missing) = only
            .iter()
            .find(|id| !self.entries.iter().any(|e| &e.id == *id))
        {
            return Err(CatalogError::UnknownId(missing.clone()));
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| only.contains(&e.id))
            .cloned()
            .collect())
    }
}
