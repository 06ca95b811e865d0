//! Serve CLI command: run both refresh loops until shutdown.

use super::PatrolApp;
use crate::storage::{DocumentStore, FileStore};
use anyhow::Result;
use std::future::Future;
use tokio::sync::watch;

/// Runs the snapshot and folder index loops until `shutdown` resolves.
///
/// Both loops tick immediately, so the views are populated right after
/// start. In-flight cycles are cancelled and awaited before returning.
pub async fn cmd_serve<D, F>(app: &PatrolApp<D, F>, shutdown: impl Future<Output = ()>) -> Result<()>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    let (tx, rx) = watch::channel(false);
    let candidates = app.candidate_task().spawn(rx.clone());
    let folders = app.folder_task().spawn(rx);

    tracing::info!(
        database = %app.config().document_store.database,
        root_folder = %app.config().file_store.root_folder_id,
        "Planet Patrol sync engine started"
    );

    shutdown.await;
    tracing::info!("Shutdown requested, stopping refresh loops");
    // Receivers treat a dropped sender as shutdown too.
    let _ = tx.send(true);

    for (name, handle) in [("candidates", candidates), ("folders", folders)] {
        if let Err(e) = handle.await {
            tracing::warn!(source = name, error = %e, "Refresh loop ended abnormally");
        }
    }

    let state = app.state();
    tracing::info!(
        candidates = state.candidates.load().len(),
        folders = state.folders.load().len(),
        "Stopped"
    );
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
}
