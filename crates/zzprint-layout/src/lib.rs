//! Invoice sheet layout engine.
//!
//! Tiles PDF, OFD and image invoices onto printable sheets in a fixed grid
//! and writes the result as a single merged PDF.

pub mod compose;
pub mod constants;
#[cfg(feature = "serde")]
mod history;
pub mod layout;
mod marks;
mod options;
mod preview;
pub mod render;
mod source;
mod stats;
mod types;

pub use compose::{compose, compose_with_progress, load_multiple_pdfs, load_pdf, save_pdf};
#[cfg(feature = "serde")]
pub use history::PrintHistory;
pub use options::*;
pub use preview::{DEFAULT_PREVIEW_SOURCES, generate_preview};
pub use source::{
    SUPPORTED_EXTENSIONS, SourceContent, SourceDocument, SourceKind, detect_kind, display_name,
    load_source, load_sources, scan_directory,
};
pub use stats::calculate_statistics;
pub use types::*;
