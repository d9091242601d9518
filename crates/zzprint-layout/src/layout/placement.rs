//! Where each invoice lands inside its cell
//!
//! Pages are scaled uniformly into the padded cell and centred. With
//! auto-rotate on, a page may be turned a quarter when it then shows larger.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{Rotation, ScalingMode};

use super::{CellRef, GridPosition, PagePlacement, Rect, SheetGeometry, content_area};

/// Calculate the placement of one source page inside a content area.
///
/// `source_width` and `source_height` are the page's displayed size in
/// points (its own /Rotate already applied). The page is scaled uniformly
/// and centred; `rotation` turns it further before fitting.
pub fn place_page(
    cell: CellRef,
    grid_pos: GridPosition,
    content_area: &Rect,
    source_width: f32,
    source_height: f32,
    scaling_mode: ScalingMode,
    rotation: Rotation,
) -> PagePlacement {
    let (width, height) = if rotation.is_quarter_turn() {
        (source_height, source_width)
    } else {
        (source_width, source_height)
    };

    let scale = calculate_scale(
        width,
        height,
        content_area.width,
        content_area.height,
        scaling_mode,
    );

    let scaled_width = width * scale;
    let scaled_height = height * scale;

    let x = content_area.center_x() - scaled_width / 2.0;
    let y = content_area.center_y() - scaled_height / 2.0;

    PagePlacement {
        cell,
        grid_pos,
        content_rect: Rect::new(x, y, scaled_width, scaled_height),
        scale,
        rotation,
    }
}

/// Pick the layout rotation for a page.
///
/// Without `auto_rotate` pages keep their orientation. With it, a page is
/// turned a quarter clockwise when that makes it strictly larger.
pub fn choose_rotation(
    auto_rotate: bool,
    content_area: &Rect,
    source_width: f32,
    source_height: f32,
    scaling_mode: ScalingMode,
) -> Rotation {
    if !auto_rotate {
        return Rotation::None;
    }

    let upright = calculate_scale(
        source_width,
        source_height,
        content_area.width,
        content_area.height,
        scaling_mode,
    );
    let turned = calculate_scale(
        source_height,
        source_width,
        content_area.width,
        content_area.height,
        scaling_mode,
    );

    if turned > upright * 1.001 {
        Rotation::Clockwise90
    } else {
        Rotation::None
    }
}

/// Calculate placements for the cells of one sheet.
///
/// # Arguments
/// * `geometry` - Sheet geometry
/// * `cells` - Source pages for this sheet, in row-major cell order
/// * `source_dimensions` - Displayed (width, height) per source, per page
/// * `padding_mm` - Cell padding
/// * `scaling_mode` - How to scale pages
/// * `auto_rotate` - Whether quarter turns may be applied
pub fn calculate_placements(
    geometry: &SheetGeometry,
    cells: &[CellRef],
    source_dimensions: &[Vec<(f32, f32)>],
    padding_mm: f32,
    scaling_mode: ScalingMode,
    auto_rotate: bool,
) -> Vec<PagePlacement> {
    cells
        .iter()
        .enumerate()
        .map(|(index, &cell)| {
            let grid_pos = GridPosition::from_index(index, geometry.cols);
            let area = content_area(&geometry.cell_bounds(grid_pos), padding_mm);

            let (src_width, src_height) = source_dimensions
                .get(cell.source)
                .and_then(|pages| pages.get(cell.page).copied())
                .unwrap_or(DEFAULT_PAGE_DIMENSIONS);

            let rotation = choose_rotation(auto_rotate, &area, src_width, src_height, scaling_mode);
            place_page(
                cell,
                grid_pos,
                &area,
                src_width,
                src_height,
                scaling_mode,
                rotation,
            )
        })
        .collect()
}

/// Uniform scale that fits a source box into a target box
fn calculate_scale(
    src_width: f32,
    src_height: f32,
    target_width: f32,
    target_height: f32,
    mode: ScalingMode,
) -> f32 {
    if src_width <= 0.0 || src_height <= 0.0 {
        return 1.0;
    }

    let fit = (target_width / src_width).min(target_height / src_height);
    match mode {
        ScalingMode::Fit => fit,
        ScalingMode::ShrinkToFit => fit.min(1.0),
    }
}
