//! Raster invoices (scans and photos) as Form XObjects

use image::{DynamicImage, Rgb, RgbImage, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Embed an RGB image and wrap it in a Form XObject one unit per pixel.
///
/// Wrapping keeps images interchangeable with PDF pages: both are placed
/// through the same form transformation.
pub fn create_image_xobject(output: &mut Document, image: &RgbImage) -> ObjectId {
    let (width, height) = image.dimensions();

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(i64::from(width)));
    image_dict.set("Height", Object::Integer(i64::from(height)));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    let image_id = output.add_object(Stream::new(image_dict, image.as_raw().clone()));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut form_dict = Dictionary::new();
    form_dict.set("Type", Object::Name(b"XObject".to_vec()));
    form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    form_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(i64::from(width)),
            Object::Integer(i64::from(height)),
        ]),
    );
    form_dict.set("FormType", Object::Integer(1));
    form_dict.set("Resources", Object::Dictionary(resources));

    let content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q\n", width, height);
    output.add_object(Stream::new(form_dict, content.into_bytes()))
}

/// Composite a decoded image over white and drop its alpha channel.
///
/// Transparent areas of scans print as paper, not black.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let over_white = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}
