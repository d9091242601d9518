//! Document I/O for layout output

use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Load multiple PDF documents
pub async fn load_multiple_pdfs(paths: &[impl AsRef<Path>]) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(load_pdf(path).await?);
    }
    Ok(documents)
}

/// Compress and save the laid-out document.
///
/// The parent directory must already exist.
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        doc.compress();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, LayoutError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(())
}
