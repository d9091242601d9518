//! Grid geometry
//!
//! This module handles the geometric layout of the cell grid on a sheet:
//! sheet size, printable area and cell bounds.

use crate::constants::mm_to_pt;
use crate::options::LayoutOptions;
use crate::types::{Grid, Orientation, PaperSize, SheetMargins};

use super::{GridPosition, Rect};

/// Geometry shared by every sheet of a layout run
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGeometry {
    /// Sheet width in points
    pub sheet_width_pt: f32,
    /// Sheet height in points
    pub sheet_height_pt: f32,
    /// Area inside the sheet margins
    pub printable: Rect,
    pub cols: usize,
    pub rows: usize,
    pub cell_width_pt: f32,
    pub cell_height_pt: f32,
}

impl SheetGeometry {
    /// Compute the geometry for a paper size, orientation, margins and grid
    pub fn new(
        paper: PaperSize,
        orientation: Orientation,
        margins: &SheetMargins,
        grid: Grid,
    ) -> Self {
        let (width_mm, height_mm) = paper.dimensions_with_orientation(orientation);
        let sheet_width_pt = mm_to_pt(width_mm);
        let sheet_height_pt = mm_to_pt(height_mm);

        let printable = Rect::new(
            mm_to_pt(margins.left_mm),
            mm_to_pt(margins.bottom_mm),
            sheet_width_pt - mm_to_pt(margins.left_mm) - mm_to_pt(margins.right_mm),
            sheet_height_pt - mm_to_pt(margins.top_mm) - mm_to_pt(margins.bottom_mm),
        );

        let (cols, rows) = grid.dimensions();
        let cols = cols.max(1);
        let rows = rows.max(1);

        Self {
            sheet_width_pt,
            sheet_height_pt,
            printable,
            cols,
            rows,
            cell_width_pt: printable.width / cols as f32,
            cell_height_pt: printable.height / rows as f32,
        }
    }

    /// Geometry described by layout options
    pub fn from_options(options: &LayoutOptions) -> Self {
        Self::new(
            options.paper_size,
            options.orientation,
            &options.sheet_margins,
            options.grid,
        )
    }

    /// Total number of cells on a sheet
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Bounds of the cell at a grid position.
    ///
    /// Row 0 is the top row; PDF y grows upward, so rows are counted down
    /// from the top of the printable area.
    pub fn cell_bounds(&self, pos: GridPosition) -> Rect {
        let x = self.printable.x + pos.col as f32 * self.cell_width_pt;
        let y = self.printable.y + (self.rows - pos.row - 1) as f32 * self.cell_height_pt;
        Rect::new(x, y, self.cell_width_pt, self.cell_height_pt)
    }

    /// Bounds of the `index`th cell in row-major order from the top-left
    pub fn cell_bounds_at(&self, index: usize) -> Rect {
        self.cell_bounds(GridPosition::from_index(index, self.cols))
    }

    /// x coordinates of the boundaries between columns
    pub fn column_boundaries(&self) -> Vec<f32> {
        (1..self.cols)
            .map(|col| self.printable.x + col as f32 * self.cell_width_pt)
            .collect()
    }

    /// y coordinates of the boundaries between rows
    pub fn row_boundaries(&self) -> Vec<f32> {
        (1..self.rows)
            .map(|row| self.printable.y + row as f32 * self.cell_height_pt)
            .collect()
    }
}

/// Area of a cell available for content after padding
pub fn content_area(cell: &Rect, padding_mm: f32) -> Rect {
    cell.inset(mm_to_pt(padding_mm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4(grid: Grid) -> SheetGeometry {
        SheetGeometry::new(
            PaperSize::A4,
            Orientation::Portrait,
            &SheetMargins::default(),
            grid,
        )
    }

    #[test]
    fn test_a4_sheet_size() {
        let geometry = a4(Grid::OneByOne);
        assert!((geometry.sheet_width_pt - 595.28).abs() < 0.1);
        assert!((geometry.sheet_height_pt - 841.89).abs() < 0.1);
    }

    #[test]
    fn test_one_by_two_stacks_vertically() {
        let geometry = a4(Grid::OneByTwo);
        assert_eq!(geometry.cols, 1);
        assert_eq!(geometry.rows, 2);

        let top = geometry.cell_bounds_at(0);
        let bottom = geometry.cell_bounds_at(1);
        assert!((top.width - geometry.sheet_width_pt).abs() < 0.01);
        assert!(top.y > bottom.y);
        assert!((bottom.y - 0.0).abs() < 0.01);
        assert!((top.top() - geometry.sheet_height_pt).abs() < 0.01);
    }

    #[test]
    fn test_two_by_four_fills_row_major() {
        let geometry = a4(Grid::TwoByFour);
        assert_eq!(geometry.cell_count(), 8);

        // Index 1 is the top-right cell
        let top_right = geometry.cell_bounds_at(1);
        assert!((top_right.x - geometry.cell_width_pt).abs() < 0.01);
        assert!((top_right.top() - geometry.sheet_height_pt).abs() < 0.01);

        // Index 2 starts the second row on the left
        let second_row = geometry.cell_bounds_at(2);
        assert!((second_row.x - 0.0).abs() < 0.01);
        assert!((second_row.top() - (geometry.sheet_height_pt - geometry.cell_height_pt)).abs() < 0.01);
    }

    #[test]
    fn test_margins_shrink_printable_area() {
        let geometry = SheetGeometry::new(
            PaperSize::A4,
            Orientation::Portrait,
            &SheetMargins::uniform(10.0),
            Grid::TwoByTwo,
        );
        let margin = mm_to_pt(10.0);
        assert!((geometry.printable.x - margin).abs() < 0.01);
        assert!((geometry.printable.width - (geometry.sheet_width_pt - 2.0 * margin)).abs() < 0.01);

        let bottom_left = geometry.cell_bounds(GridPosition::new(1, 0));
        assert!((bottom_left.x - margin).abs() < 0.01);
        assert!((bottom_left.y - margin).abs() < 0.01);
    }

    #[test]
    fn test_boundaries() {
        let geometry = a4(Grid::TwoByThree);
        assert_eq!(geometry.column_boundaries().len(), 1);
        assert_eq!(geometry.row_boundaries().len(), 2);
        assert!(a4(Grid::OneByOne).column_boundaries().is_empty());
    }

    #[test]
    fn test_content_area_padding() {
        let cell = Rect::new(0.0, 0.0, 300.0, 200.0);
        let area = content_area(&cell, crate::constants::DEFAULT_CELL_PADDING_MM);
        assert!((area.x - 10.0).abs() < 0.01);
        assert!((area.width - 280.0).abs() < 0.01);
        assert!((area.height - 180.0).abs() < 0.01);
    }
}
