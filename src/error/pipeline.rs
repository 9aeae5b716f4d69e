use thiserror::Error;

use super::validation::ValidationError;

/// Message shown when a step fails for a reason other than validation.
pub const GENERIC_FAILURE: &str = "Failed to validate image";

/// Any failure of a photo pipeline step.
///
/// Validation rejections carry their own message; everything else (I/O,
/// backend or task failures) is collapsed into [`GENERIC_FAILURE`] when shown
/// to the user, so the surrounding form never sees a raw backend error.
///
/// # Example
/// ```
/// use photo_intake::error::pipeline::{PipelineError, GENERIC_FAILURE};
/// use photo_intake::error::validation::ValidationError;
///
/// let err = PipelineError::Read("permission denied".into());
/// assert_eq!(err.user_message(), GENERIC_FAILURE);
///
/// let err = PipelineError::from(ValidationError::Missing);
/// assert_eq!(err.user_message(), "Please select a photo");
/// ```
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to read selected file: {0}")]
    Read(String),

    #[error("image backend failed: {0}")]
    Backend(String),

    #[error("no crop session is open")]
    NoSession,

    #[error("photo step was superseded by a newer action")]
    Superseded,
}

impl PipelineError {
    /// Text for the photo control and toast notification.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Invalid(e) => e.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Returns the validation rejection, if that is what this error is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            PipelineError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_validation_errors_map_to_generic_message() {
        for err in [
            PipelineError::Read("eof".into()),
            PipelineError::Backend("encoder".into()),
            PipelineError::NoSession,
            PipelineError::Superseded,
        ] {
            assert_eq!(err.user_message(), GENERIC_FAILURE);
            assert!(err.as_validation().is_none());
        }
    }

    #[test]
    fn validation_errors_are_transparent() {
        let err = PipelineError::from(ValidationError::Unreadable);
        assert_eq!(err.to_string(), "Unable to read the image file");
        assert_eq!(err.as_validation(), Some(&ValidationError::Unreadable));
    }
}
