//! Output sheet rendering

use crate::layout::{CellRef, PagePlacement, SheetGeometry, SheetLayout};
use crate::marks::generate_cut_guides;
use crate::source::{SourceContent, SourceDocument, display_name};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::{
    PageFrame, create_image_xobject, create_page_xobject, create_placeholder_xobject, page_frames,
};

/// Form XObjects already written to the output document.
///
/// Every copy of a source page reuses one form, and objects copied out of a
/// source are tracked per source since object ids overlap between files.
/// Under [`FailurePolicy::Placeholder`] a page that cannot be turned into a
/// form gets a placeholder form instead.
#[derive(Debug, Default)]
pub struct XObjectCache {
    policy: FailurePolicy,
    forms: HashMap<CellRef, ObjectId>,
    copied: HashMap<usize, HashMap<ObjectId, ObjectId>>,
    unreadable: HashMap<usize, String>,
}

impl XObjectCache {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Number of distinct forms written so far
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Measure every source page.
    ///
    /// A source whose pages cannot be measured collapses to a single
    /// placeholder cell under the placeholder policy.
    pub fn measure(&mut self, sources: &[SourceDocument]) -> Result<Vec<Vec<PageFrame>>> {
        sources
            .iter()
            .enumerate()
            .map(|(index, source)| match page_frames(source) {
                Ok(frames) => Ok(frames),
                Err(e) if self.policy == FailurePolicy::Placeholder => {
                    log::warn!("Cannot measure {}: {}", source.path.display(), e);
                    self.unreadable.insert(index, e.to_string());
                    Ok(vec![PageFrame::placeholder()])
                }
                Err(e) => Err(e),
            })
            .collect()
    }

    /// Write the form for a source page unless it exists already.
    ///
    /// When the page falls back to a placeholder, its entry in `frames` is
    /// replaced by the placeholder frame so placement matches the form.
    pub fn prepare(
        &mut self,
        output: &mut Document,
        sources: &[SourceDocument],
        frames: &mut [Vec<PageFrame>],
        cell: CellRef,
    ) -> Result<ObjectId> {
        if let Some(&id) = self.forms.get(&cell) {
            return Ok(id);
        }

        let source = sources.get(cell.source).ok_or_else(|| {
            LayoutError::Config(format!("No source at index {}", cell.source))
        })?;
        let frame = frames
            .get_mut(cell.source)
            .and_then(|pages| pages.get_mut(cell.page))
            .ok_or_else(|| {
                LayoutError::Config(format!(
                    "{} has no page {}",
                    source.path.display(),
                    cell.page + 1
                ))
            })?;

        let id = if let Some(reason) = self.unreadable.get(&cell.source) {
            create_placeholder_xobject(output, &display_name(&source.path), reason)
        } else {
            match &source.content {
                SourceContent::Pdf(doc) => {
                    let copied = self.copied.entry(cell.source).or_default();
                    let created = match frame.page_id {
                        Some(page_id) => create_page_xobject(output, doc, page_id, frame, copied),
                        None => Err(LayoutError::Config(format!(
                            "{} page frame has no page",
                            source.path.display()
                        ))),
                    };
                    match created {
                        Ok(id) => id,
                        Err(e) if self.policy == FailurePolicy::Placeholder => {
                            log::warn!(
                                "Cannot render page {} of {}: {}",
                                cell.page + 1,
                                source.path.display(),
                                e
                            );
                            // Ids reserved by the failed copy were never filled
                            copied.retain(|_, new_id| output.objects.contains_key(&*new_id));
                            *frame = PageFrame::placeholder();
                            create_placeholder_xobject(
                                output,
                                &display_name(&source.path),
                                &e.to_string(),
                            )
                        }
                        Err(e) => return Err(e),
                    }
                }
                SourceContent::Image(image) => create_image_xobject(output, image),
                SourceContent::Placeholder { reason } => {
                    create_placeholder_xobject(output, &display_name(&source.path), reason)
                }
            }
        };

        self.forms.insert(cell, id);
        Ok(id)
    }

    /// Form already prepared for a source page
    pub fn form(&self, cell: CellRef) -> Result<ObjectId> {
        self.forms.get(&cell).copied().ok_or_else(|| {
            LayoutError::Config(format!(
                "No form prepared for page {} of source {}",
                cell.page + 1,
                cell.source
            ))
        })
    }
}

/// Render one sheet to the output document.
///
/// Forms for every placed page must already be prepared in `cache`.
pub fn render_sheet(
    output: &mut Document,
    frames: &[Vec<PageFrame>],
    cache: &XObjectCache,
    layout: &SheetLayout,
    geometry: &SheetGeometry,
    parent_pages_id: ObjectId,
    cut_guides: bool,
) -> Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.sheet_width_pt),
            Object::Real(geometry.sheet_height_pt),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    for placement in &layout.placements {
        let form_id = cache.form(placement.cell)?;
        let frame = frames
            .get(placement.cell.source)
            .and_then(|pages| pages.get(placement.cell.page))
            .copied()
            .unwrap_or_else(|| PageFrame::unrotated(1.0, 1.0));

        let name = format!("Inv{}", form_id.0);
        xobjects.set(name.as_bytes(), Object::Reference(form_id));

        let [a, b, c, d, e, f] = placement_matrix(&frame, placement);
        content_ops.push(format!(
            "q {} {} {} {} {} {} cm /{} Do Q\n",
            a, b, c, d, e, f, name
        ));
    }

    if cut_guides {
        content_ops.push(generate_cut_guides(geometry));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

/// Transformation matrix `[a b c d e f]` mapping a form into its placement.
///
/// The form's bounding box is moved to the origin, turned clockwise by the
/// page's own /Rotate plus the layout rotation, scaled, and anchored at the
/// placement rect.
pub fn placement_matrix(frame: &PageFrame, placement: &PagePlacement) -> [f32; 6] {
    let s = placement.scale;
    let (bx, by) = (frame.bbox.x, frame.bbox.y);
    let rect = &placement.content_rect;

    match frame.rotate.then(placement.rotation) {
        Rotation::None => [s, 0.0, 0.0, s, rect.x - s * bx, rect.y - s * by],
        Rotation::Clockwise90 => [0.0, -s, s, 0.0, rect.x - s * by, rect.top() + s * bx],
        Rotation::Clockwise180 => [-s, 0.0, 0.0, -s, rect.right() + s * bx, rect.top() + s * by],
        Rotation::Clockwise270 => [0.0, s, -s, 0.0, rect.right() + s * by, rect.y - s * bx],
    }
}
