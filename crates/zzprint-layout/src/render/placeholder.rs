//! Placeholder cells for sources that cannot be rendered

use crate::constants::{
    HELVETICA_CHAR_WIDTH_RATIO, PLACEHOLDER_DIMENSIONS, PLACEHOLDER_FONT_SIZE, PLACEHOLDER_TEXT_INSET,
    PLACEHOLDER_TITLE_FONT_SIZE,
};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Create a framed Form XObject naming the file and why it is missing.
///
/// Text uses the standard Helvetica font, so characters outside printable
/// ASCII are shown as `?`.
pub fn create_placeholder_xobject(output: &mut Document, file_name: &str, reason: &str) -> ObjectId {
    let (width, height) = PLACEHOLDER_DIMENSIONS;

    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    let font_id = output.add_object(font_dict);

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut ops = String::new();
    // Frame
    ops.push_str(&format!(
        "q 0.5 G 1 w [6 3] 0 d 2 2 {} {} re S Q\n",
        width - 4.0,
        height - 4.0
    ));

    let text_x = PLACEHOLDER_TEXT_INSET;
    let mut text_y = height / 2.0 + PLACEHOLDER_TITLE_FONT_SIZE;
    ops.push_str(&format!(
        "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
        PLACEHOLDER_TITLE_FONT_SIZE,
        text_x,
        text_y,
        pdf_text("Invoice could not be rendered")
    ));

    let max_chars =
        ((width - 2.0 * text_x) / (PLACEHOLDER_FONT_SIZE * HELVETICA_CHAR_WIDTH_RATIO)) as usize;
    for line in [format!("File: {}", file_name), reason.to_string()] {
        let line = truncate_line(&line, max_chars);
        text_y -= PLACEHOLDER_FONT_SIZE * 2.0;
        ops.push_str(&format!(
            "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
            PLACEHOLDER_FONT_SIZE,
            text_x,
            text_y,
            pdf_text(&line)
        ));
    }

    let mut form_dict = Dictionary::new();
    form_dict.set("Type", Object::Name(b"XObject".to_vec()));
    form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    form_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ]),
    );
    form_dict.set("FormType", Object::Integer(1));
    form_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(Stream::new(form_dict, ops.into_bytes()))
}

/// Shorten `line` to at most `max_chars` characters, marking the cut with "..."
fn truncate_line(line: &str, max_chars: usize) -> String {
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let mut short: String = line.chars().take(max_chars.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

/// Escape text for a PDF literal string in a standard 14 font
pub fn pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}
