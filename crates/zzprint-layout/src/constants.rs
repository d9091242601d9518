//! Shared constants for sheet layout
//!
//! This module centralizes magic numbers and constants used throughout
//! the layout process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Copies
// =============================================================================

/// Smallest repeat count for a document
pub const MIN_COPIES: u8 = 1;

/// Largest repeat count for a document
pub const MAX_COPIES: u8 = 4;

/// Repeat count used when nothing else is configured
pub const DEFAULT_COPIES: u8 = 1;

/// Upper bound on columns or rows of a custom grid
pub const MAX_GRID_DIMENSION: usize = 8;

// =============================================================================
// Cells
// =============================================================================

/// Inset applied on every side of a cell: 10pt, expressed in mm
pub const DEFAULT_CELL_PADDING_MM: f32 = 10.0 / POINTS_PER_MM;

/// Page size assumed when a source page has no usable box (A4 in points)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (595.0, 842.0);

/// Size of the form drawn for an unreadable source (half an A4 sheet)
pub const PLACEHOLDER_DIMENSIONS: (f32, f32) = (595.0, 421.0);

// =============================================================================
// Guides and Text
// =============================================================================

/// Line width for cut guides (points)
pub const CUT_GUIDE_WIDTH: f32 = 0.5;

/// Dash pattern for cut guides: dash, gap (points)
pub const CUT_GUIDE_DASH: (f32, f32) = (4.0, 3.0);

/// Gray level of cut guides (0 = black, 1 = white)
pub const CUT_GUIDE_GRAY: f32 = 0.6;

/// Font size of the placeholder title (points)
pub const PLACEHOLDER_TITLE_FONT_SIZE: f32 = 14.0;

/// Font size of the placeholder detail lines (points)
pub const PLACEHOLDER_FONT_SIZE: f32 = 10.0;

/// Inner inset of placeholder text from the form edge (points)
pub const PLACEHOLDER_TEXT_INSET: f32 = 20.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Read buffer used when hashing files for the print history
pub const HASH_CHUNK_SIZE: usize = 8192;
