//! Background worker for invoice layout jobs.
//!
//! A front end sends [`PrintCommand`]s over an unbounded channel and
//! receives [`PrintUpdate`]s back, so slow PDF work never blocks it.

mod handlers;
pub mod logger;
mod worker;

use lopdf::Document;
use std::path::PathBuf;
use std::sync::Arc;

// Re-export types from the layout crate
pub use zzprint_layout::{FailurePolicy, Grid, InputFile, LayoutOptions, LayoutStatistics};

pub use logger::{AppLogger, LogEntry};
pub use worker::{spawn_worker, worker_task};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum PrintCommand {
    /// Load (or reuse cached) sources and report what was found
    LoadSources {
        files: Vec<InputFile>,
        policy: FailurePolicy,
    },
    CalculateStats {
        options: LayoutOptions,
    },
    /// Build the first sheets of a layout; queued requests collapse to the newest
    GeneratePreview {
        options: LayoutOptions,
        max_sheets: usize,
    },
    /// Lay out every sheet and save the merged PDF
    Generate {
        options: LayoutOptions,
        output_path: PathBuf,
        /// Print history to update once the output is saved
        history_path: Option<PathBuf>,
    },
    /// Report which files appear in the print history
    CheckHistory {
        files: Vec<PathBuf>,
        history_path: PathBuf,
    },
    /// Forget cached sources, e.g. after files changed on disk
    ClearCache,
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum PrintUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    SourcesLoaded {
        documents: usize,
        pages: usize,
        placeholders: usize,
    },
    StatsCalculated {
        stats: LayoutStatistics,
    },
    PreviewGenerated {
        document: Arc<Document>,
        page_count: usize,
    },
    PrintedBefore {
        files: Vec<PathBuf>,
    },
    Complete {
        path: PathBuf,
        sheet_count: usize,
    },
    Error {
        message: String,
    },
}
