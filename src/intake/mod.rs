//! The photo intake pipeline: candidate → pre-crop validation → crop
//! session → rasterization → post-crop validation → artifact.

pub mod artifact;
pub mod candidate;
pub mod crop;
pub mod field;
pub mod preview;
pub mod source;
pub mod validator;
