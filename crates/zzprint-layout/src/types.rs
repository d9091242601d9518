use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to lay out")]
    NoPages,
    #[error("Unsupported source file: {}", .0.display())]
    UnsupportedSource(PathBuf),
    #[error("Print history error: {0}")]
    History(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Portrait (width, height) in millimetres
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// (width, height) in millimetres for the given orientation
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Grid arrangement of invoices on a sheet.
///
/// Labels read columns × rows: `1×2` is a single column of two invoices
/// stacked top and bottom, `2×4` is two columns of four rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Grid {
    /// One invoice per sheet
    OneByOne,
    /// Two invoices stacked vertically
    #[default]
    OneByTwo,
    /// Three invoices stacked vertically
    OneByThree,
    /// Two columns, two rows
    TwoByTwo,
    /// Two columns, three rows
    TwoByThree,
    /// Two columns, four rows
    TwoByFour,
    Custom { cols: usize, rows: usize },
}

impl Grid {
    /// The six arrangements offered by default
    pub const PRESETS: [Grid; 6] = [
        Grid::OneByOne,
        Grid::OneByTwo,
        Grid::OneByThree,
        Grid::TwoByTwo,
        Grid::TwoByThree,
        Grid::TwoByFour,
    ];

    /// Build a grid from dimensions, collapsing onto a preset when one matches
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.dimensions() == (cols, rows))
            .unwrap_or(Grid::Custom { cols, rows })
    }

    /// (columns, rows)
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Grid::OneByOne => (1, 1),
            Grid::OneByTwo => (1, 2),
            Grid::OneByThree => (1, 3),
            Grid::TwoByTwo => (2, 2),
            Grid::TwoByThree => (2, 3),
            Grid::TwoByFour => (2, 4),
            Grid::Custom { cols, rows } => (cols, rows),
        }
    }

    pub fn cols(self) -> usize {
        self.dimensions().0
    }

    pub fn rows(self) -> usize {
        self.dimensions().1
    }

    pub fn cells_per_sheet(self) -> usize {
        let (cols, rows) = self.dimensions();
        cols * rows
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cols, rows) = self.dimensions();
        write!(f, "{cols}×{rows}")
    }
}

impl FromStr for Grid {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LayoutError::Config(format!("Invalid grid '{s}', expected e.g. 1×2 or 2x3"));

        let (cols, rows) = s
            .trim()
            .split_once(['×', 'x', 'X', '*'])
            .ok_or_else(invalid)?;
        let cols: usize = cols.trim().parse().map_err(|_| invalid())?;
        let rows: usize = rows.trim().parse().map_err(|_| invalid())?;
        if cols == 0 || rows == 0 {
            return Err(invalid());
        }
        Ok(Grid::new(cols, rows))
    }
}

/// Page scaling behavior when source pages don't match the cell size.
/// Both modes scale uniformly, so the source aspect ratio is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingMode {
    /// Largest size that fits the cell, enlarging small sources
    #[default]
    Fit,
    /// Fit the cell but never enlarge beyond the source size
    ShrinkToFit,
}

/// Clockwise rotation applied to a placed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize any multiple of 90 degrees; other values snap to `None`
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Clockwise90,
            180 => Rotation::Clockwise180,
            270 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    /// Combine two clockwise rotations
    pub fn then(self, other: Rotation) -> Self {
        Self::from_degrees(i64::from(self.degrees() + other.degrees()))
    }

    /// Whether width and height trade places
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Order of repeated pages in the cell sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageOrder {
    /// Each copy is a complete run of the document: A1 A2 A1 A2
    #[default]
    Collated,
    /// Each page is repeated in place: A1 A1 A2 A2
    Grouped,
}

/// What to do with a source that cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Keep a cell for it showing the file name and the reason
    #[default]
    Placeholder,
    /// Fail the whole layout
    Abort,
}

/// Blank border around the printable area of each sheet, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetMargins {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl SheetMargins {
    /// Same margin on all four sides
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            bottom_mm: margin_mm,
            left_mm: margin_mm,
            right_mm: margin_mm,
        }
    }
}

/// Statistics about a layout run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutStatistics {
    /// Number of source documents
    pub source_documents: usize,
    /// Pages across all sources, before repetition
    pub source_pages: usize,
    /// Cells that receive content (pages × copies)
    pub placed_cells: usize,
    /// Grid cells on each sheet
    pub cells_per_sheet: usize,
    /// Output sheets (pages of the merged PDF)
    pub output_sheets: usize,
    /// Unused cells on the last sheet
    pub empty_cells: usize,
    /// Sources that could not be read and show a placeholder
    pub placeholder_sources: usize,
}
