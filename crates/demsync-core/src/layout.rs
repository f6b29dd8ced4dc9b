//! On-disk layout under the data root.
//!
//! `{data_dir}/downloads/dem/{id}.tif` is the staging file a transfer writes to;
//! `{data_dir}/ready/dem/{id}.tif` is the last verified copy. Both live under the
//! same root so promotion is a same-filesystem rename.

use std::path::PathBuf;

const STAGING_DIR: &str = "downloads";
const READY_DIR: &str = "ready";
const DATASET: &str = "dem";
const EXTENSION: &str = "tif";

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR).join(DATASET)
    }

    pub fn ready_dir(&self) -> PathBuf {
        self.root.join(READY_DIR).join(DATASET)
    }

    /// Staging path for `id`. The id must already be validated.
    pub fn staging_path(&self, id: &str) -> PathBuf {
        self.staging_dir().join(file_name(id))
    }

    /// Ready path for `id`. The id must already be validated.
    pub fn ready_path(&self, id: &str) -> PathBuf {
        self.ready_dir().join(file_name(id))
    }
}

fn file_name(id: &str) -> String {
    format!("{}.{}", id, EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn paths_follow_layout() {
        let layout = DataLayout::new("/srv/data");
        assert_eq!(
            layout.staging_path("N60E024"),
            Path::new("/srv/data/downloads/dem/N60E024.tif")
        );
        assert_eq!(
            layout.ready_path("N60E024"),
            Path::new("/srv/data/ready/dem/N60E024.tif")
        );
    }

    #[test]
    fn ready_path_mirrors_staging_path() {
        let layout = DataLayout::new("data");
        let staging = layout.staging_path("x");
        let ready = layout.ready_path("x");
        assert_eq!(staging.file_name(), ready.file_name());
        assert_ne!(staging.parent(), ready.parent());
    }
}
