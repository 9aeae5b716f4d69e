//! Error types shared by every pipeline step.

pub mod pipeline;
pub mod validation;
