//! # Photo Validators
//!
//! Pre-crop checks run on the file as selected; post-crop checks run on the
//! rasterized crop output. Both return the decoded `(width, height)` on
//! success and a [`ValidationError`] otherwise; neither panics on malformed
//! input.
//!
//! Pre-crop order (first failure wins):
//! 1. file present
//! 2. MIME type is JPEG or PNG
//! 3. file-name extension is `.jpg`, `.jpeg` or `.png`
//! 4. byte length within [`PhotoPolicy::pre_crop`]
//! 5. image decodes
//!
//! # Example
//! ```rust
//! use photo_intake::config::photo::PhotoPolicy;
//! use photo_intake::error::validation::ValidationError;
//! use photo_intake::image::image_rs_processor::ImageRsProcessor;
//! use photo_intake::intake::candidate::ImageCandidate;
//! use photo_intake::intake::validator::validate_pre_crop;
//!
//! let file = ImageCandidate::new("photo.txt", "image/png", vec![0u8; 40 * 1024]);
//! let err = validate_pre_crop(Some(&file), &PhotoPolicy::passport(), &ImageRsProcessor)
//!     .unwrap_err();
//! assert!(matches!(err, ValidationError::UnsupportedExtension { .. }));
//! ```

use tracing::{debug, warn};

use super::candidate::ImageCandidate;
use crate::config::photo::{PhotoPolicy, SizeBounds};
use crate::error::validation::{Stage, ValidationError};
use crate::image::processor::ImageProcessor;

/// MIME types accepted before cropping.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// File-name extensions accepted before cropping.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// MIME type of every crop output.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Accepts JPEG or PNG, and only when the backend can decode the type.
pub fn check_content_type(
    content_type: &str,
    processor: &dyn ImageProcessor,
) -> Result<(), ValidationError> {
    let ct = content_type.trim().to_ascii_lowercase();
    if ALLOWED_CONTENT_TYPES.contains(&ct.as_str()) && processor.is_supported(&ct) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType {
            content_type: content_type.to_string(),
        })
    }
}

pub fn check_extension(candidate: &ImageCandidate) -> Result<(), ValidationError> {
    match candidate.extension() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::UnsupportedExtension {
            file_name: candidate.file_name().to_string(),
        }),
    }
}

pub fn check_size(len: u64, bounds: &SizeBounds, stage: Stage) -> Result<(), ValidationError> {
    if let Some(min) = bounds.min_bytes {
        if len < min {
            return Err(ValidationError::TooSmall {
                stage,
                actual: len,
                min,
            });
        }
    }
    if len > bounds.max_bytes {
        return Err(ValidationError::TooLarge {
            stage,
            actual: len,
            max: bounds.max_bytes,
        });
    }
    Ok(())
}

/// Decodes the bytes; corrupt data and empty rasters are reported as unreadable.
pub fn check_decodable(
    img_bytes: &[u8],
    processor: &dyn ImageProcessor,
) -> Result<(u32, u32), ValidationError> {
    match processor.dimensions(img_bytes) {
        Ok((w, h)) if w > 0 && h > 0 => Ok((w, h)),
        Ok((w, h)) => {
            warn!(w, h, "decoded image has an empty raster");
            Err(ValidationError::Unreadable)
        }
        Err(e) => {
            warn!(error = %e, "image could not be decoded");
            Err(ValidationError::Unreadable)
        }
    }
}

/// Runs the cheap checks (steps 1–4) that need no decoding.
pub fn check_candidate<'a>(
    candidate: Option<&'a ImageCandidate>,
    policy: &PhotoPolicy,
    processor: &dyn ImageProcessor,
) -> Result<&'a ImageCandidate, ValidationError> {
    let candidate = candidate.ok_or(ValidationError::Missing)?;
    check_content_type(candidate.content_type(), processor)?;
    check_extension(candidate)?;
    check_size(candidate.len(), &policy.pre_crop, Stage::PreCrop)?;
    Ok(candidate)
}

/// Full pre-crop validation of a selected file.
pub fn validate_pre_crop(
    candidate: Option<&ImageCandidate>,
    policy: &PhotoPolicy,
    processor: &dyn ImageProcessor,
) -> Result<(u32, u32), ValidationError> {
    let result = check_candidate(candidate, policy, processor)
        .and_then(|c| check_decodable(c.bytes(), processor));

    match &result {
        Ok((w, h)) => debug!(w, h, "pre-crop validation passed"),
        Err(e) => debug!(reason = %e, "pre-crop validation failed"),
    }
    result
}

/// Post-crop validation of the rasterized output.
pub fn validate_post_crop(
    img_bytes: &[u8],
    content_type: &str,
    policy: &PhotoPolicy,
    processor: &dyn ImageProcessor,
) -> Result<(u32, u32), ValidationError> {
    if !content_type.eq_ignore_ascii_case(OUTPUT_CONTENT_TYPE) {
        return Err(ValidationError::UnsupportedType {
            content_type: content_type.to_string(),
        });
    }
    check_size(img_bytes.len() as u64, &policy.post_crop, Stage::PostCrop)?;

    let (width, height) = check_decodable(img_bytes, processor)?;
    let (expected_width, expected_height) = policy.target_dimensions();
    if (width, height) != (expected_width, expected_height) {
        warn!(
            width,
            height, expected_width, expected_height, "crop output has the wrong raster size"
        );
        return Err(ValidationError::DimensionMismatch {
            width,
            height,
            expected_width,
            expected_height,
        });
    }

    debug!(bytes = img_bytes.len(), "post-crop validation passed");
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation::ErrorKind;
    use crate::image::image_rs_processor::ImageRsProcessor;
    use crate::image::processor::{CropRegion, RenderOpts};
    use anyhow::{Result, bail};

    /// Reports fixed dimensions for any input.
    struct FixedDims(u32, u32);

    impl ImageProcessor for FixedDims {
        fn is_supported(&self, _content_type: &str) -> bool {
            true
        }
        fn dimensions(&self, _img_bytes: &[u8]) -> Result<(u32, u32)> {
            Ok((self.0, self.1))
        }
        fn render_crop(&self, _: &[u8], _: CropRegion, _: RenderOpts) -> Result<Vec<u8>> {
            bail!("not used")
        }
    }

    /// A backend that decodes JPEG only.
    struct JpegOnly;

    impl ImageProcessor for JpegOnly {
        fn is_supported(&self, content_type: &str) -> bool {
            content_type == "image/jpeg"
        }
        fn dimensions(&self, _img_bytes: &[u8]) -> Result<(u32, u32)> {
            Ok((7, 9))
        }
        fn render_crop(&self, _: &[u8], _: CropRegion, _: RenderOpts) -> Result<Vec<u8>> {
            bail!("not used")
        }
    }

    fn policy(min: Option<u64>, max: u64) -> PhotoPolicy {
        let b = SizeBounds::new(min, max);
        PhotoPolicy::with_target(413, 413, b, b)
    }

    fn file(name: &str, ct: &str, len: usize) -> ImageCandidate {
        ImageCandidate::new(name, ct, vec![0u8; len])
    }

    #[test]
    fn missing_file_fails_first() {
        let err = validate_pre_crop(None, &policy(None, 10), &FixedDims(1, 1)).unwrap_err();
        assert_eq!(err, ValidationError::Missing);
        assert_eq!(err.kind(), ErrorKind::InputRejected);
    }

    #[test]
    fn disallowed_mime_types_are_rejected() {
        for ct in ["image/gif", "image/webp", "text/plain", "application/pdf", ""] {
            let f = file("a.jpg", ct, 5);
            let err = validate_pre_crop(Some(&f), &policy(None, 10), &FixedDims(1, 1)).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedType { .. }),
                "{ct:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn mime_check_is_case_insensitive() {
        assert!(check_content_type("IMAGE/PNG", &ImageRsProcessor).is_ok());
        assert!(check_content_type("image/jpg", &ImageRsProcessor).is_ok());
    }

    #[test]
    fn mime_check_defers_to_backend_support() {
        let p = policy(None, 10);
        let png = file("a.png", "image/png", 5);
        let err = validate_pre_crop(Some(&png), &p, &JpegOnly).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                content_type: "image/png".into()
            }
        );

        let jpg = file("a.jpg", "image/jpeg", 5);
        assert_eq!(validate_pre_crop(Some(&jpg), &p, &JpegOnly), Ok((7, 9)));
        assert!(check_content_type("image/gif", &FixedDims(1, 1)).is_err());
    }

    #[test]
    fn extension_is_checked_on_name_only() {
        let f = file("photo.txt", "image/png", 5);
        let err = validate_pre_crop(Some(&f), &policy(None, 10), &FixedDims(1, 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedExtension {
                file_name: "photo.txt".into()
            }
        );

        for name in ["a.JPG", "b.jpeg", "c.Png"] {
            assert!(check_extension(&file(name, "image/png", 1)).is_ok(), "{name}");
        }
        assert!(check_extension(&file("noext", "image/png", 1)).is_err());
        assert!(check_extension(&file("x.gif", "image/png", 1)).is_err());
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let p = policy(Some(100), 200);
        let dims = FixedDims(10, 10);

        assert!(validate_pre_crop(Some(&file("a.png", "image/png", 100)), &p, &dims).is_ok());
        assert!(validate_pre_crop(Some(&file("a.png", "image/png", 200)), &p, &dims).is_ok());

        let err = validate_pre_crop(Some(&file("a.png", "image/png", 99)), &p, &dims).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooSmall {
                stage: Stage::PreCrop,
                actual: 99,
                min: 100
            }
        );
        let err = validate_pre_crop(Some(&file("a.png", "image/png", 201)), &p, &dims).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeOutOfRange);
    }

    #[test]
    fn size_at_minimum_reaches_decode_step() {
        let p = policy(Some(30 * 1024), 300 * 1024);
        let f = file("a.jpg", "image/jpeg", 30 * 1024);
        let err = validate_pre_crop(Some(&f), &p, &ImageRsProcessor).unwrap_err();
        assert_eq!(err, ValidationError::Unreadable);
    }

    #[test]
    fn empty_raster_is_unreadable() {
        let f = file("a.png", "image/png", 5);
        let err = validate_pre_crop(Some(&f), &policy(None, 10), &FixedDims(0, 10)).unwrap_err();
        assert_eq!(err, ValidationError::Unreadable);
    }

    #[test]
    fn post_crop_requires_jpeg_mime() {
        let err =
            validate_post_crop(b"x", "image/png", &policy(None, 10), &FixedDims(413, 413)).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn post_crop_checks_size_then_dimensions() {
        let p = policy(Some(2), 4);
        let err = validate_post_crop(b"x", "image/jpeg", &p, &FixedDims(413, 413)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooSmall {
                stage: Stage::PostCrop,
                actual: 1,
                min: 2
            }
        );

        let err = validate_post_crop(b"xyz", "image/jpeg", &p, &FixedDims(412, 413)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DimensionMismatch {
                width: 412,
                height: 413,
                expected_width: 413,
                expected_height: 413
            }
        );

        assert_eq!(
            validate_post_crop(b"xyz", "image/jpeg", &p, &FixedDims(413, 413)),
            Ok((413, 413))
        );
    }

    #[test]
    fn repeated_rejection_is_identical() {
        let f = file("scan.bmp", "image/bmp", 50);
        let p = policy(None, 100);
        let first = validate_pre_crop(Some(&f), &p, &FixedDims(1, 1));
        let second = validate_pre_crop(Some(&f), &p, &FixedDims(1, 1));
        assert_eq!(first, second);
        assert!(first.is_err());
    }
}
