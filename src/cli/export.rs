//! Export CLI command.

use super::PatrolApp;
use crate::io::ExportMode;
use crate::storage::{DocumentStore, FileStore};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fetches one snapshot and writes the disposition CSV.
///
/// With `output` set to a directory the suggested file name is used inside
/// it; a file path is used as is; `None` writes to `out`. Returns the
/// number of data rows.
pub async fn cmd_export<D, F>(
    app: &PatrolApp<D, F>,
    all: bool,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<usize>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    app.load_candidates()
        .await
        .context("failed to fetch candidate snapshot")?;

    let mode = if all {
        ExportMode::All
    } else {
        ExportMode::DesignatedOnly
    };
    let export = app.review_service().export_csv(mode)?;

    match output {
        Some(path) => {
            let target = resolve_target(path, export.file_name);
            std::fs::write(&target, &export.content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(path = %target.display(), rows = export.rows, "CSV exported");
        },
        None => out.write_all(&export.content)?,
    }
    Ok(export.rows)
}

fn resolve_target(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    }
}
