//! `demsync sync` – run every selected catalog entry and report outcomes.

use anyhow::Result;
use demsync_core::catalog::Catalog;
use demsync_core::config::DemSyncConfig;
use demsync_core::{EntryOutcome, SyncSummary, Syncer};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

pub async fn run_sync(cfg: &DemSyncConfig, catalog: &Catalog, only: &[String]) -> Result<()> {
    let entries = catalog.select(only)?;
    if entries.is_empty() {
        println!("No entries in catalog.");
        return Ok(());
    }

    let syncer = Syncer::new(cfg.http_client()?, cfg.layout(), cfg.task_options());
    tracing::info!(
        entries = entries.len(),
        data_dir = %cfg.data_dir.display(),
        "starting sync"
    );

    // Ctrl-C cancels every in-flight entry; each still reports an outcome.
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling in-flight downloads");
                cancel.cancel();
            }
        })
    };

    let mut summary = SyncSummary::default();
    let mut outcomes = syncer.sync_stream(&entries, &cancel);
    while let Some(outcome) = outcomes.next().await {
        print_outcome(&outcome);
        summary.record(&outcome);
    }
    interrupt.abort();

    println!(
        "{} up to date, {} updated, {} failed",
        summary.up_to_date, summary.updated, summary.failed
    );
    if summary.failed > 0 {
        anyhow::bail!("{} of {} entries failed", summary.failed, summary.total());
    }
    Ok(())
}

fn print_outcome(outcome: &EntryOutcome) {
    let line = format!(
        "{:<16} {:<10} {}",
        outcome.id,
        outcome.status.to_string(),
        outcome.detail
    );
    if outcome.is_success() {
        println!("{}", line);
    } else {
        eprintln!("{}", line);
    }
}
