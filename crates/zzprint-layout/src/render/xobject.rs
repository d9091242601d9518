//! Source PDF pages as Form XObjects
//!
//! Each page becomes one self-contained form: its content streams,
//! its resources copied into the output, and its visible box as BBox.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::Rect;
use crate::types::{Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::PageFrame;

/// Deepest /Parent chain followed when looking up inherited attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// The XObject can then be placed multiple times on output sheets
/// with different transformations.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The page within `source`
/// * `frame` - The page's frame, as returned by [`page_frame`]
/// * `cache` - Object copy cache for this source document
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    frame: &PageFrame,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let content = page_content(source, page_dict)?;

    let bbox = &frame.bbox;
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(bbox.x),
            Object::Real(bbox.y),
            Object::Real(bbox.right()),
            Object::Real(bbox.top()),
        ]),
    );
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_dict, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Visible box and rotation of a source page.
///
/// Uses the CropBox when present, otherwise the MediaBox, following the
/// page tree for inherited values. Pages without a usable box get A4.
pub fn page_frame(doc: &Document, page_id: ObjectId) -> Result<PageFrame> {
    let page_dict = doc.get_dictionary(page_id)?;

    let bbox = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .filter_map(|key| inherited_attribute(doc, page_dict, key))
        .find_map(|obj| parse_box(doc, obj))
        .unwrap_or_else(|| Rect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1));

    let rotate = inherited_attribute(doc, page_dict, b"Rotate")
        .and_then(|obj| resolve(doc, obj).as_i64().ok())
        .map(Rotation::from_degrees)
        .unwrap_or_default();

    Ok(PageFrame {
        page_id: Some(page_id),
        bbox,
        rotate,
    })
}

/// Look up a page attribute, walking up /Parent for inheritable keys
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = page_dict;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        dict = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Follow a single indirect reference, if any
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Parse a rectangle array into a normalized `Rect`
fn parse_box(doc: &Document, obj: &Object) -> Option<Rect> {
    let values: Vec<f32> = resolve(doc, obj)
        .as_array()
        .ok()?
        .iter()
        .map(|item| extract_number(resolve(doc, item)))
        .collect::<Option<_>>()?;

    let &[x1, y1, x2, y2] = values.as_slice() else {
        return None;
    };
    let rect = Rect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs());
    (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Content Streams
// =============================================================================

/// Decoded page content, with multiple streams joined by newlines.
///
/// A page without /Contents is blank.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let stream_ids: Vec<ObjectId> = match resolve(doc, contents) {
        Object::Array(items) => items
            .iter()
            .filter_map(|item| item.as_reference().ok())
            .collect(),
        Object::Stream(_) => contents.as_reference().into_iter().collect(),
        _ => Vec::new(),
    };

    let mut data = Vec::new();
    for id in stream_ids {
        let stream = doc.get_object(id).and_then(Object::as_stream)?;
        data.extend(
            stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
        );
        data.push(b'\n');
    }
    Ok(data)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. The output
/// id is reserved before recursing, so reference cycles terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = source.get_object(*id)?;
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                // Page-tree links would drag whole source pages along
                if key.as_slice() == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            let mut new_stream = Stream::new(new_dict, stream.content.clone());
            new_stream.allows_compression = stream.allows_compression;
            Ok(Object::Stream(new_stream))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_page(page: Dictionary, parent: Dictionary) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut page = page;
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        let page_id = doc.add_object(page);

        let mut parent = parent;
        parent.set("Type", Object::Name(b"Pages".to_vec()));
        parent.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        parent.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(parent));
        (doc, page_id)
    }

    fn rect_array(values: [i64; 4]) -> Object {
        Object::Array(values.into_iter().map(Object::Integer).collect())
    }

    #[test]
    fn test_frame_prefers_crop_box() {
        let mut page = Dictionary::new();
        page.set("MediaBox", rect_array([0, 0, 612, 792]));
        page.set("CropBox", rect_array([10, 20, 410, 320]));
        let (doc, page_id) = doc_with_page(page, Dictionary::new());

        let frame = page_frame(&doc, page_id).unwrap();
        assert_eq!(frame.bbox, Rect::new(10.0, 20.0, 400.0, 300.0));
        assert_eq!(frame.rotate, Rotation::None);
    }

    #[test]
    fn test_frame_inherits_from_parent() {
        let mut parent = Dictionary::new();
        parent.set("MediaBox", rect_array([0, 0, 680, 396]));
        parent.set("Rotate", Object::Integer(90));
        let (doc, page_id) = doc_with_page(Dictionary::new(), parent);

        let frame = page_frame(&doc, page_id).unwrap();
        assert_eq!(frame.bbox, Rect::new(0.0, 0.0, 680.0, 396.0));
        assert_eq!(frame.rotate, Rotation::Clockwise90);
        assert_eq!(frame.displayed_dimensions(), (396.0, 680.0));
    }

    #[test]
    fn test_frame_defaults_without_box() {
        let (doc, page_id) = doc_with_page(Dictionary::new(), Dictionary::new());
        let frame = page_frame(&doc, page_id).unwrap();
        assert_eq!(frame.bbox.width, DEFAULT_PAGE_DIMENSIONS.0);
        assert_eq!(frame.bbox.height, DEFAULT_PAGE_DIMENSIONS.1);
    }

    #[test]
    fn test_frame_normalizes_inverted_box() {
        let mut page = Dictionary::new();
        page.set("MediaBox", rect_array([612, 792, 0, 0]));
        let (doc, page_id) = doc_with_page(page, Dictionary::new());

        let frame = page_frame(&doc, page_id).unwrap();
        assert_eq!(frame.bbox, Rect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_copy_object_deep_handles_cycles() {
        let mut source = Document::with_version("1.7");
        let a_id = source.new_object_id();
        let b_id = source.add_object(Dictionary::from_iter(vec![("Next", Object::Reference(a_id))]));
        source.objects.insert(
            a_id,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(b_id))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = HashMap::new();
        let copied =
            copy_object_deep(&mut output, &source, &Object::Reference(a_id), &mut cache).unwrap();

        assert!(matches!(copied, Object::Reference(_)));
        assert_eq!(output.objects.len(), 2);
        assert_eq!(cache.len(), 2);
    }
}
