//! PDF rendering modules
//!
//! This module handles all PDF-specific operations:
//! - Creating Form XObjects from source pages, images and placeholders
//! - Building output sheets
//! - Generating transformation matrices
//! - Deep copying PDF objects

mod raster;
mod placeholder;
mod sheet;
mod xobject;

pub use raster::{create_image_xobject, flatten_onto_white};
pub use placeholder::{create_placeholder_xobject, pdf_text};
pub use sheet::{XObjectCache, placement_matrix, render_sheet};
pub use xobject::{copy_object_deep, create_page_xobject, page_frame};

use crate::constants::PLACEHOLDER_DIMENSIONS;
use crate::layout::Rect;
use crate::source::{SourceContent, SourceDocument};
use crate::types::{Result, Rotation};
use lopdf::ObjectId;

/// Geometry of one source page as drawn by its Form XObject
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Page object in the source document (PDF sources only)
    pub page_id: Option<ObjectId>,
    /// Form bounding box in source units
    pub bbox: Rect,
    /// The page's own clockwise /Rotate
    pub rotate: Rotation,
}

impl PageFrame {
    /// Frame for content drawn into a box anchored at the origin
    pub fn unrotated(width: f32, height: f32) -> Self {
        Self {
            page_id: None,
            bbox: Rect::new(0.0, 0.0, width, height),
            rotate: Rotation::None,
        }
    }

    /// Frame of a placeholder form
    pub fn placeholder() -> Self {
        Self::unrotated(PLACEHOLDER_DIMENSIONS.0, PLACEHOLDER_DIMENSIONS.1)
    }

    /// Size of the page as a viewer shows it
    pub fn displayed_dimensions(&self) -> (f32, f32) {
        if self.rotate.is_quarter_turn() {
            (self.bbox.height, self.bbox.width)
        } else {
            (self.bbox.width, self.bbox.height)
        }
    }
}

/// Frames for every page of a source, in page order
pub fn page_frames(source: &SourceDocument) -> Result<Vec<PageFrame>> {
    match &source.content {
        SourceContent::Pdf(doc) => doc
            .get_pages()
            .values()
            .map(|&page_id| page_frame(doc, page_id))
            .collect(),
        SourceContent::Image(image) => Ok(vec![PageFrame::unrotated(
            image.width() as f32,
            image.height() as f32,
        )]),
        SourceContent::Placeholder { .. } => Ok(vec![PageFrame::placeholder()]),
    }
}
