use crate::layout::{sheet_count, total_cells};
use crate::options::LayoutOptions;
use crate::source::SourceDocument;
use crate::types::*;

/// Calculate statistics for a layout run without rendering it.
///
/// Options are checked the same way compose checks them, so statistics are
/// only reported for layouts that can be produced.
pub fn calculate_statistics(
    sources: &[SourceDocument],
    options: &LayoutOptions,
) -> Result<LayoutStatistics> {
    options.validate_layout()?;

    let page_counts: Vec<usize> = sources.iter().map(SourceDocument::page_count).collect();
    let copies: Vec<u8> = (0..sources.len()).map(|i| options.copies_for(i)).collect();

    let source_pages: usize = page_counts.iter().sum();
    let placed_cells = total_cells(&page_counts, &copies);
    if placed_cells == 0 {
        return Err(LayoutError::NoPages);
    }

    let cells_per_sheet = options.grid.cells_per_sheet();
    let output_sheets = sheet_count(placed_cells, cells_per_sheet);
    let empty_cells = output_sheets * cells_per_sheet - placed_cells;

    Ok(LayoutStatistics {
        source_documents: sources.len(),
        source_pages,
        placed_cells,
        cells_per_sheet,
        output_sheets,
        empty_cells,
        placeholder_sources: sources.iter().filter(|s| s.is_placeholder()).count(),
    })
}
