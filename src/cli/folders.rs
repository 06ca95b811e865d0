//! Folder index and file lookup CLI commands.

use super::PatrolApp;
use crate::models::CandidateId;
use crate::storage::{DocumentStore, FileStore};
use anyhow::{Context, Result};
use std::io::Write;

/// Builds the folder index once and prints the count and every folder.
pub async fn cmd_folders<D, F>(app: &PatrolApp<D, F>, out: &mut impl Write) -> Result<usize>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    let count = app
        .load_folders()
        .await
        .context("failed to build folder index")?;
    let index = app.state().folders.load();

    writeln!(out, "{count} folders under {}", index.root_id())?;
    for folder in index.folders() {
        writeln!(out, "{}\t{}\t{}", folder.id, folder.parent_id, folder.name)?;
    }
    Ok(count)
}

/// Builds the folder index once, then lists the candidate's files.
pub async fn cmd_files<D, F>(
    app: &PatrolApp<D, F>,
    candidate: &CandidateId,
    out: &mut impl Write,
) -> Result<usize>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    app.load_folders()
        .await
        .context("failed to build folder index")?;
    let files = app.review_service().files(candidate).await;

    if files.is_empty() {
        writeln!(out, "No files found for {candidate}")?;
    }
    for file in &files {
        writeln!(
            out,
            "{}\t{}\t{}",
            file.name,
            file.id,
            file.content_link.as_deref().unwrap_or("-")
        )?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatrolConfig;
    use crate::storage::{MemoryDocumentStore, MemoryFileStore};
    use std::sync::Arc;

    fn app() -> PatrolApp<MemoryDocumentStore, MemoryFileStore> {
        let files = MemoryFileStore::new();
        files.add_folder("root", "s1", "Sector 1");
        files.add_folder("s1", "s1a", "Camera 1");
        files.add_file("root", "r1", "100_root.pdf", "application/pdf");
        files.add_file("s1a", "f1", "100_lc.pdf", "application/pdf");
        let mut config = PatrolConfig::default();
        config.file_store.root_folder_id = "root".to_string();
        PatrolApp::new(config, Arc::new(MemoryDocumentStore::new()), Arc::new(files))
    }

    #[tokio::test]
    async fn test_folders_lists_index() {
        let mut out = Vec::new();
        let count = cmd_folders(&app(), &mut out).await.unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2 folders under root"));
        assert!(text.contains("s1a\ts1\tCamera 1"));
    }

    #[tokio::test]
    async fn test_files_skips_root_level_files() {
        let mut out = Vec::new();
        let count = cmd_files(&app(), &CandidateId::new("100"), &mut out)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("100_lc.pdf\tf1\t"));
    }
}
