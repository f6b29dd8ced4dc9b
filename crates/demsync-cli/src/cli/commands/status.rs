//! `demsync status` – show local files for each catalog entry.

use anyhow::Result;
use demsync_core::catalog::Catalog;
use demsync_core::config::DemSyncConfig;
use demsync_core::digest;

pub async fn run_status(cfg: &DemSyncConfig, catalog: &Catalog) -> Result<()> {
    if catalog.entries.is_empty() {
        println!("No entries in catalog.");
        return Ok(());
    }
    let layout = cfg.layout();
    println!(
        "{:<16} {:<12} {:<26} {}",
        "ID", "SIZE", "READY MD5", "STAGING"
    );
    for entry in &catalog.entries {
        let ready = layout.ready_path(&entry.id);
        let (size_str, md5_str) = match tokio::fs::metadata(&ready).await {
            Ok(meta) => {
                let md5 = digest::md5_base64_path(&ready)
                    .await
                    .map(|d| d.to_string())
                    .unwrap_or_else(|e| format!("unreadable: {}", e));
                (meta.len().to_string(), md5)
            }
            Err(_) => ("-".to_string(), "-".to_string()),
        };
        let staging = if tokio::fs::try_exists(layout.staging_path(&entry.id))
            .await
            .unwrap_or(false)
        {
            "leftover"
        } else {
            "-"
        };
        println!(
            "{:<16} {:<12} {:<26} {}",
            entry.id, size_str, md5_str, staging
        );
    }
    Ok(())
}
