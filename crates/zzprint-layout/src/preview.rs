use crate::compose::compose_sync;
use crate::options::LayoutOptions;
use crate::source::SourceDocument;
use crate::types::*;
use lopdf::Document;

/// Number of leading sources shown by a default preview
pub const DEFAULT_PREVIEW_SOURCES: usize = 12;

/// Generate a preview of the layout.
///
/// Returns a document holding only the first `max_sheets` sheets (at
/// least one), laid out exactly as the full run would place them.
pub async fn generate_preview(
    sources: &[SourceDocument],
    options: &LayoutOptions,
    max_sheets: usize,
) -> Result<Document> {
    options.validate()?;

    let sources = sources.to_vec();
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        compose_sync(&sources, &options, Some(max_sheets), &mut |_, _| {})
    })
    .await?
}
