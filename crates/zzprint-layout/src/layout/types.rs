//! Layout data types
//!
//! These types represent the intermediate layout calculations between
//! cell sequencing and PDF rendering.

use crate::types::Rotation;

/// Reference to one page of one source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Index into the source list
    pub source: usize,
    /// Page index within that source (0-based)
    pub page: usize,
}

impl CellRef {
    pub fn new(source: usize, page: usize) -> Self {
        Self { source, page }
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major position of the `index`th cell
    pub fn from_index(index: usize, cols: usize) -> Self {
        Self {
            row: index / cols,
            col: index % cols,
        }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Shrink by `inset` on every side, never below zero size
    pub fn inset(&self, inset: f32) -> Rect {
        let width = (self.width - 2.0 * inset).max(0.0);
        let height = (self.height - 2.0 * inset).max(0.0);
        Rect::new(
            self.center_x() - width / 2.0,
            self.center_y() - height / 2.0,
            width,
            height,
        )
    }

    /// Whether `other` lies within this rect, allowing for rounding
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 0.01;
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.top() <= self.top() + EPSILON
    }
}

/// Final placement of a source page inside a cell
///
/// This is the result of all layout calculations and contains
/// everything needed to render the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlacement {
    /// The source page shown in this cell
    pub cell: CellRef,
    /// Cell position in the grid
    pub grid_pos: GridPosition,
    /// Position and size of the visible content in points (after rotation)
    pub content_rect: Rect,
    /// Uniform scale factor applied to the source page
    pub scale: f32,
    /// Clockwise rotation applied by the layout (excluding the page's own /Rotate)
    pub rotation: Rotation,
}

/// Everything needed to render one output sheet
#[derive(Debug, Clone)]
pub struct SheetLayout {
    /// 0-based sheet number
    pub index: usize,
    /// Placements in cell order
    pub placements: Vec<PagePlacement>,
}
