//! Source documents: detection, loading and folder import

use crate::options::InputFile;
use crate::render::flatten_onto_white;
use crate::types::*;
use image::RgbImage;
use lopdf::Document;
use std::path::{Path, PathBuf};

/// File extensions accepted as invoice sources
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["pdf", "ofd", "png", "jpg", "jpeg", "bmp"];

/// Kind of source file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Ofd,
    Image,
    /// Unsupported extension; only ever carried by a placeholder
    Other,
}

/// Loaded content of a source
#[derive(Debug, Clone)]
pub enum SourceContent {
    Pdf(Document),
    Image(RgbImage),
    /// The source could not be rendered; it occupies one cell with a notice
    Placeholder { reason: String },
}

/// A source document ready for layout
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub content: SourceContent,
}

impl SourceDocument {
    pub fn from_pdf(path: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            path: path.into(),
            kind: SourceKind::Pdf,
            content: SourceContent::Pdf(document),
        }
    }

    pub fn from_image(path: impl Into<PathBuf>, image: RgbImage) -> Self {
        Self {
            path: path.into(),
            kind: SourceKind::Image,
            content: SourceContent::Image(image),
        }
    }

    pub fn placeholder(path: impl Into<PathBuf>, kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            content: SourceContent::Placeholder {
                reason: reason.into(),
            },
        }
    }

    /// Number of cells one copy of this source occupies
    pub fn page_count(&self) -> usize {
        match &self.content {
            SourceContent::Pdf(doc) => doc.get_pages().len(),
            SourceContent::Image(_) | SourceContent::Placeholder { .. } => 1,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, SourceContent::Placeholder { .. })
    }
}

/// Detect the source kind from the file extension (case-insensitive)
pub fn detect_kind(path: impl AsRef<Path>) -> Result<SourceKind> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => Ok(SourceKind::Pdf),
        Some("ofd") => Ok(SourceKind::Ofd),
        Some("png" | "jpg" | "jpeg" | "bmp") => Ok(SourceKind::Image),
        _ => Err(LayoutError::UnsupportedSource(path.to_owned())),
    }
}

/// Load a single source document
pub async fn load_source(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref().to_owned();
    let kind = detect_kind(&path)?;

    match kind {
        SourceKind::Pdf => {
            let bytes = tokio::fs::read(&path).await?;
            let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
            Ok(SourceDocument::from_pdf(path, doc))
        }
        SourceKind::Image => {
            let bytes = tokio::fs::read(&path).await?;
            let image = tokio::task::spawn_blocking(move || {
                image::load_from_memory(&bytes).map(|img| flatten_onto_white(&img))
            })
            .await??;
            Ok(SourceDocument::from_image(path, image))
        }
        SourceKind::Ofd => {
            // Fail early on a missing file, same as the other kinds
            tokio::fs::metadata(&path).await?;
            Ok(SourceDocument::placeholder(
                path,
                SourceKind::Ofd,
                "OFD rendering is not supported",
            ))
        }
        SourceKind::Other => Err(LayoutError::UnsupportedSource(path)),
    }
}

/// Load all input files in order.
///
/// Under [`FailurePolicy::Placeholder`] a source that cannot be loaded is
/// replaced by a placeholder; under [`FailurePolicy::Abort`] the first
/// error is returned.
pub async fn load_sources(files: &[InputFile], policy: FailurePolicy) -> Result<Vec<SourceDocument>> {
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        match load_source(&file.path).await {
            Ok(source) => {
                log::debug!(
                    "Loaded {} ({} page(s))",
                    file.path.display(),
                    source.page_count()
                );
                sources.push(source);
            }
            Err(e) if policy == FailurePolicy::Placeholder => {
                log::warn!("Cannot read {}: {}", file.path.display(), e);
                let kind = detect_kind(&file.path).unwrap_or(SourceKind::Other);
                sources.push(SourceDocument::placeholder(
                    file.path.clone(),
                    kind,
                    e.to_string(),
                ));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(sources)
}

/// List supported source files directly inside `dir`, sorted by file name
pub async fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && detect_kind(&path).is_ok() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// File name with stray characters removed, for lists and log lines.
///
/// Keeps CJK ideographs, ASCII letters and digits and `._()-`; falls back
/// to the raw file name when nothing survives.
pub fn display_name(path: impl AsRef<Path>) -> String {
    let raw = path
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let clean: String = raw
        .chars()
        .filter(|c| {
            ('\u{4e00}'..='\u{9fa5}').contains(c)
                || c.is_ascii_alphanumeric()
                || matches!(c, '.' | '_' | '(' | ')' | '-')
        })
        .collect();

    if clean.is_empty() { raw } else { clean }
}
