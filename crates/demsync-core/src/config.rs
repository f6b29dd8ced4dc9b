use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::layout::DataLayout;
use crate::task::TaskOptions;

/// Global configuration loaded from `~/.config/demsync/config.toml`.
/// Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemSyncConfig {
    /// Data root holding `downloads/dem/` and `ready/dem/`.
    pub data_dir: PathBuf,
    /// Catalog of entries to sync; defaults to `catalog.toml` next to this file.
    pub catalog: Option<PathBuf>,
    /// TCP connect timeout in seconds (None = no limit).
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds, body included (None = no limit).
    pub request_timeout_secs: Option<u64>,
    /// Remove staging files of entries that did not promote.
    pub discard_partial_staging: bool,
    /// Override the User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for DemSyncConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog: None,
            connect_timeout_secs: None,
            request_timeout_secs: None,
            discard_partial_staging: false,
            user_agent: None,
        }
    }
}

impl DemSyncConfig {
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }

    pub fn task_options(&self) -> TaskOptions {
        TaskOptions {
            discard_partial_staging: self.discard_partial_staging,
        }
    }

    /// HTTP client with the configured timeouts. Redirects are followed
    /// (reqwest default, up to 10).
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("demsync/{}", env!("CARGO_PKG_VERSION")));
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(secs) = self.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("build HTTP client")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("demsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Default catalog location: `catalog.toml` in the config directory.
pub fn default_catalog_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("demsync")?;
    Ok(xdg_dirs.get_config_home().join("catalog.toml"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DemSyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DemSyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<DemSyncConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: DemSyncConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
