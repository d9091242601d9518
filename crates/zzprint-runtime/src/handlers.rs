use crate::PrintUpdate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use zzprint_layout::{
    FailurePolicy, InputFile, LayoutError, LayoutOptions, PrintHistory, SourceDocument,
    calculate_statistics, compose_with_progress, generate_preview, load_sources, save_pdf,
};

/// Sources kept between commands while the input list is unchanged
#[derive(Default)]
pub struct SourceCache {
    entry: Option<CachedSources>,
}

struct CachedSources {
    paths: Vec<PathBuf>,
    policy: FailurePolicy,
    sources: Vec<SourceDocument>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached sources if the paths match, otherwise load and cache
    pub async fn get_or_load(
        &mut self,
        files: &[InputFile],
        policy: FailurePolicy,
    ) -> Result<&[SourceDocument], LayoutError> {
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();

        let hit = self
            .entry
            .as_ref()
            .is_some_and(|c| c.paths == paths && c.policy == policy);

        if hit {
            log::debug!("Using cached sources");
        } else {
            log::debug!("Loading sources (cache miss or paths changed)");
            let sources = load_sources(files, policy).await?;
            self.entry = Some(CachedSources {
                paths,
                policy,
                sources,
            });
        }

        Ok(self
            .entry
            .as_ref()
            .map(|c| c.sources.as_slice())
            .unwrap_or_default())
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

fn send_error(update_tx: &mpsc::UnboundedSender<PrintUpdate>, message: String) {
    log::error!("{}", message);
    let _ = update_tx.send(PrintUpdate::Error { message });
}

pub async fn handle_load_sources(
    files: Vec<InputFile>,
    policy: FailurePolicy,
    cache: &mut SourceCache,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    match cache.get_or_load(&files, policy).await {
        Ok(sources) => {
            let _ = update_tx.send(PrintUpdate::SourcesLoaded {
                documents: sources.len(),
                pages: sources.iter().map(SourceDocument::page_count).sum(),
                placeholders: sources.iter().filter(|s| s.is_placeholder()).count(),
            });
        }
        Err(e) => send_error(update_tx, format!("Failed to load invoices: {}", e)),
    }
}

pub async fn handle_calculate_stats(
    options: LayoutOptions,
    cache: &mut SourceCache,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    if options.input_files.is_empty() {
        send_error(update_tx, "No input files specified".to_string());
        return;
    }

    let sources = match cache
        .get_or_load(&options.input_files, options.failure_policy)
        .await
    {
        Ok(sources) => sources,
        Err(e) => {
            send_error(update_tx, format!("Failed to load invoices for stats: {}", e));
            return;
        }
    };

    match calculate_statistics(sources, &options) {
        Ok(stats) => {
            let _ = update_tx.send(PrintUpdate::StatsCalculated { stats });
        }
        Err(e) => send_error(update_tx, format!("Failed to calculate statistics: {}", e)),
    }
}

pub async fn handle_generate_preview(
    options: LayoutOptions,
    max_sheets: usize,
    cache: &mut SourceCache,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    if options.input_files.is_empty() {
        send_error(update_tx, "No input files specified".to_string());
        return;
    }

    let sources = match cache
        .get_or_load(&options.input_files, options.failure_policy)
        .await
    {
        Ok(sources) => sources,
        Err(e) => {
            send_error(update_tx, format!("Failed to load invoices: {}", e));
            return;
        }
    };

    if let Ok(stats) = calculate_statistics(sources, &options) {
        let _ = update_tx.send(PrintUpdate::StatsCalculated { stats });
    }

    match generate_preview(sources, &options, max_sheets).await {
        Ok(document) => {
            let page_count = document.get_pages().len();
            let _ = update_tx.send(PrintUpdate::PreviewGenerated {
                document: Arc::new(document),
                page_count,
            });
        }
        Err(e) => send_error(update_tx, format!("Failed to generate preview: {}", e)),
    }
}

pub async fn handle_generate(
    options: LayoutOptions,
    output_path: PathBuf,
    history_path: Option<PathBuf>,
    cache: &mut SourceCache,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    if options.input_files.is_empty() {
        send_error(update_tx, "No input files specified".to_string());
        return;
    }

    let _ = update_tx.send(PrintUpdate::Progress {
        operation: "Loading invoices".to_string(),
        current: 0,
        total: options.input_files.len(),
    });

    let sources = match cache
        .get_or_load(&options.input_files, options.failure_policy)
        .await
    {
        Ok(sources) => sources,
        Err(e) => {
            send_error(update_tx, format!("Failed to load invoices: {}", e));
            return;
        }
    };

    let progress_tx = update_tx.clone();
    let merged = match compose_with_progress(sources, &options, move |current, total| {
        let _ = progress_tx.send(PrintUpdate::Progress {
            operation: "Laying out sheets".to_string(),
            current,
            total,
        });
    })
    .await
    {
        Ok(doc) => doc,
        Err(e) => {
            send_error(update_tx, format!("Failed to lay out invoices: {}", e));
            return;
        }
    };

    let sheet_count = merged.get_pages().len();
    if let Err(e) = save_pdf(merged, &output_path).await {
        send_error(update_tx, format!("Failed to save PDF: {}", e));
        return;
    }

    if let Some(history_path) = history_path {
        // The output exists even if the history cannot be updated
        if let Err(e) = record_printed(&history_path, sources).await {
            log::warn!("Failed to update print history: {}", e);
        }
    }

    let _ = update_tx.send(PrintUpdate::Complete {
        path: output_path,
        sheet_count,
    });
}

pub async fn handle_check_history(
    files: Vec<PathBuf>,
    history_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    let history = match PrintHistory::load(&history_path).await {
        Ok(history) => history,
        Err(e) => {
            send_error(update_tx, format!("Failed to read print history: {}", e));
            return;
        }
    };

    let mut printed = Vec::new();
    for file in files {
        match history.was_printed(&file).await {
            Ok(true) => printed.push(file),
            Ok(false) => {}
            Err(e) => log::warn!("Cannot hash {}: {}", file.display(), e),
        }
    }

    let _ = update_tx.send(PrintUpdate::PrintedBefore { files: printed });
}

/// Record every readable source in the history at `path`.
///
/// A file that can no longer be hashed is skipped with a warning; the
/// others are still recorded.
async fn record_printed(path: &Path, sources: &[SourceDocument]) -> Result<(), LayoutError> {
    let mut history = PrintHistory::load(path).await?;
    for source in sources.iter().filter(|s| !s.is_placeholder()) {
        if let Err(e) = history.record_file(&source.path).await {
            log::warn!("Cannot record {} as printed: {}", source.path.display(), e);
        }
    }
    history.save().await
}
