//! Sheet composition
//!
//! This module orchestrates a layout run:
//! 1. Validate options and measure every source page
//! 2. Expand repeat counts into the cell sequence and split it into sheets
//! 3. Place each page in its cell
//! 4. Render the sheets into one merged output PDF

mod io;

pub use io::{load_multiple_pdfs, load_pdf, save_pdf};

use crate::layout::{SheetGeometry, SheetLayout, calculate_placements, expand_sequence, paginate};
use crate::options::LayoutOptions;
use crate::render::{PageFrame, XObjectCache, render_sheet};
use crate::source::SourceDocument;
use crate::types::*;
use lopdf::{Dictionary, Document, Object};

/// Lay out all sources onto sheets and return the merged document
pub async fn compose(sources: &[SourceDocument], options: &LayoutOptions) -> Result<Document> {
    compose_with_progress(sources, options, |_, _| {}).await
}

/// Same as [`compose`], calling `progress(done, total)` after each sheet
pub async fn compose_with_progress(
    sources: &[SourceDocument],
    options: &LayoutOptions,
    mut progress: impl FnMut(usize, usize) + Send + 'static,
) -> Result<Document> {
    options.validate()?;

    let sources = sources.to_vec();
    let options = options.clone();

    tokio::task::spawn_blocking(move || compose_sync(&sources, &options, None, &mut progress))
        .await?
}

/// Synchronous composition, optionally stopping after `max_sheets` sheets
pub(crate) fn compose_sync(
    sources: &[SourceDocument],
    options: &LayoutOptions,
    max_sheets: Option<usize>,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<Document> {
    let mut cache = XObjectCache::new(options.failure_policy);
    let mut frames = cache.measure(sources)?;
    let page_counts: Vec<usize> = frames.iter().map(Vec::len).collect();
    let copies: Vec<u8> = (0..sources.len()).map(|i| options.copies_for(i)).collect();

    let sequence = expand_sequence(&page_counts, &copies, options.page_order);
    if sequence.is_empty() {
        return Err(LayoutError::NoPages);
    }

    let geometry = SheetGeometry::from_options(options);
    let mut sheets = paginate(&sequence, geometry.cell_count());
    if let Some(limit) = max_sheets {
        sheets.truncate(limit.max(1));
    }

    // Build output document
    let mut output = Document::with_version("1.7");

    // Forms first: a page that falls back to a placeholder changes size
    for &cell in sheets.iter().flatten() {
        cache.prepare(&mut output, sources, &mut frames, cell)?;
    }

    let dimensions: Vec<Vec<(f32, f32)>> = frames
        .iter()
        .map(|pages| pages.iter().map(PageFrame::displayed_dimensions).collect())
        .collect();

    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::with_capacity(sheets.len());
    let total = sheets.len();

    for (index, cells) in sheets.iter().enumerate() {
        let layout = SheetLayout {
            index,
            placements: calculate_placements(
                &geometry,
                cells,
                &dimensions,
                options.cell_padding_mm,
                options.scaling_mode,
                options.auto_rotate,
            ),
        };
        log::debug!(
            "Sheet {}/{}: {} cell(s)",
            layout.index + 1,
            total,
            layout.placements.len()
        );

        let page_id = render_sheet(
            &mut output,
            &frames,
            &cache,
            &layout,
            &geometry,
            pages_tree_id,
            options.cut_guides,
        )?;
        page_refs.push(Object::Reference(page_id));
        progress(index + 1, total);
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    log::info!(
        "Placed {} cells from {} source(s) on {} sheet(s) ({} grid, {} form(s))",
        sheets.iter().map(Vec::len).sum::<usize>(),
        sources.len(),
        total,
        options.grid,
        cache.len()
    );

    Ok(output)
}
