//! CLI for demsync.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use demsync_core::catalog::Catalog;
use demsync_core::config::{self, DemSyncConfig};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_status, run_sync};

/// Top-level CLI for demsync.
#[derive(Debug, Parser)]
#[command(name = "demsync")]
#[command(about = "demsync: fetch, verify and promote DEM tiles", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/demsync/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every catalog entry whose remote Content-MD5 differs from the ready copy.
    Sync {
        /// Catalog file listing the entries (overrides config).
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
        /// Data root holding downloads/ and ready/ (overrides config).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Only sync these entry ids (repeatable).
        #[arg(long = "only", value_name = "ID")]
        only: Vec<String>,
    },

    /// Show the ready and staging files for each catalog entry.
    Status {
        /// Catalog file listing the entries (overrides config).
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
        /// Data root holding downloads/ and ready/ (overrides config).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Print the base64 MD5 of a file, as sent in Content-MD5.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Sync {
                catalog,
                data_dir,
                only,
            } => {
                let (cfg, catalog) = load(cli.config.as_deref(), catalog, data_dir)?;
                run_sync(&cfg, &catalog, &only).await?;
            }
            CliCommand::Status { catalog, data_dir } => {
                let (cfg, catalog) = load(cli.config.as_deref(), catalog, data_dir)?;
                run_status(&cfg, &catalog).await?;
            }
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

/// Load config and catalog, applying command-line overrides.
fn load(
    config_path: Option<&Path>,
    catalog: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<(DemSyncConfig, Catalog)> {
    let mut cfg = match config_path {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    if let Some(dir) = data_dir {
        cfg.data_dir = dir;
    }
    let catalog_path = match catalog.or_else(|| cfg.catalog.clone()) {
        Some(p) => p,
        None => config::default_catalog_path()?,
    };
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("load catalog {}", catalog_path.display()))?;
    Ok((cfg, catalog))
}

#[cfg(test)]
mod tests;
