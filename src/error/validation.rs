use serde::Serialize;
use thiserror::Error;

use crate::config::photo::KB;

/// Pipeline stage that produced a size violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreCrop,
    PostCrop,
}

fn subject(stage: &Stage) -> &'static str {
    match stage {
        Stage::PreCrop => "Photo",
        Stage::PostCrop => "Cropped photo",
    }
}

/// Coarse classification of a [`ValidationError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing file, wrong type or wrong extension.
    InputRejected,
    /// Byte length outside the configured bounds.
    SizeOutOfRange,
    /// The bytes cannot be decoded as an image.
    Unreadable,
    /// The crop output is not the required raster size.
    DimensionMismatch,
}

/// A recoverable rejection of a photo.
///
/// Every variant renders as a short message suitable for display next to the
/// photo control.
///
/// # Example
/// ```
/// use photo_intake::error::validation::{ErrorKind, Stage, ValidationError};
///
/// let err = ValidationError::TooLarge { stage: Stage::PreCrop, actual: 400 * 1024, max: 300 * 1024 };
/// assert_eq!(err.to_string(), "Photo must not exceed 300 KB (selected 400 KB)");
/// assert_eq!(err.kind(), ErrorKind::SizeOutOfRange);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a photo")]
    Missing,

    #[error("Only JPG and PNG images are allowed")]
    UnsupportedType { content_type: String },

    #[error("Photo file name must end with .jpg, .jpeg or .png")]
    UnsupportedExtension { file_name: String },

    #[error("{} must be at least {} KB (selected {} KB)", subject(.stage), kb_ceil(.min), kb_floor(.actual))]
    TooSmall { stage: Stage, actual: u64, min: u64 },

    #[error("{} must not exceed {} KB (selected {} KB)", subject(.stage), kb_floor(.max), kb_ceil(.actual))]
    TooLarge { stage: Stage, actual: u64, max: u64 },

    #[error("Unable to read the image file")]
    Unreadable,

    #[error(
        "Cropped photo must be exactly {expected_width}x{expected_height} pixels (got {width}x{height})"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Missing
            | ValidationError::UnsupportedType { .. }
            | ValidationError::UnsupportedExtension { .. } => ErrorKind::InputRejected,
            ValidationError::TooSmall { .. } | ValidationError::TooLarge { .. } => {
                ErrorKind::SizeOutOfRange
            }
            ValidationError::Unreadable => ErrorKind::Unreadable,
            ValidationError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
        }
    }
}

/// Rounded kilobytes, as shown to users.
pub fn kb(bytes: &u64) -> u64 {
    (*bytes as f64 / KB as f64).round() as u64
}

// Size messages round the limit and the actual size apart, so the shown
// numbers always differ in the direction of the violation.
fn kb_floor(bytes: &u64) -> u64 {
    bytes / KB
}

fn kb_ceil(bytes: &u64) -> u64 {
    bytes.div_ceil(KB)
}

/// The `{ valid, error? }` result every validation step reports to its caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

impl<T> From<&Result<T, ValidationError>> for ValidationOutcome {
    fn from(result: &Result<T, ValidationError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::rejected(e.to_string()),
        }
    }
}
