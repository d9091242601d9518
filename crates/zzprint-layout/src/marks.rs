//! Cut guides drawn between cells
//!
//! Invoices are cut apart after printing; the guides mark the cell
//! boundaries as light dashed lines across the printable area.

use crate::constants::{CUT_GUIDE_DASH, CUT_GUIDE_GRAY, CUT_GUIDE_WIDTH};
use crate::layout::SheetGeometry;

/// Generate cut guides as PDF content stream operations.
///
/// Returns an empty string for a 1×1 grid, which has no inner boundaries.
pub fn generate_cut_guides(geometry: &SheetGeometry) -> String {
    let columns = geometry.column_boundaries();
    let rows = geometry.row_boundaries();
    if columns.is_empty() && rows.is_empty() {
        return String::new();
    }

    let area = &geometry.printable;
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str(&format!("{} G\n", CUT_GUIDE_GRAY));
    ops.push_str(&format!("{} w\n", CUT_GUIDE_WIDTH));
    ops.push_str(&format!("[{} {}] 0 d\n", CUT_GUIDE_DASH.0, CUT_GUIDE_DASH.1));

    for x in columns {
        ops.push_str(&format!("{} {} m {} {} l S\n", x, area.y, x, area.top()));
    }
    for y in rows {
        ops.push_str(&format!("{} {} m {} {} l S\n", area.x, y, area.right(), y));
    }

    ops.push_str("Q\n");
    ops
}
