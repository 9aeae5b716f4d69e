//! EXIF orientation handling.
//!
//! Phone cameras store pixels in sensor order and record the intended
//! rotation in the EXIF `Orientation` tag. Browsers honour that tag when
//! displaying the photo, so the crop box has to be framed on the oriented
//! image as well.

use std::io::Cursor;

use image::DynamicImage;
use image::metadata::Orientation;
use tracing::debug;

/// Reads the EXIF orientation tag, if the container carries one.
pub fn exif_orientation(img_bytes: &[u8]) -> Option<Orientation> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(img_bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let raw = field.value.get_uint(0)?;
    Orientation::from_exif(u8::try_from(raw).ok()?)
}

/// Applies the EXIF orientation of `img_bytes` to an already decoded image.
pub fn apply_exif_orientation(img: &mut DynamicImage, img_bytes: &[u8]) {
    match exif_orientation(img_bytes) {
        Some(Orientation::NoTransforms) | None => {}
        Some(orientation) => {
            debug!(?orientation, "applying EXIF orientation");
            img.apply_orientation(orientation);
        }
    }
}
