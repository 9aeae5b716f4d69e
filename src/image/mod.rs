//! Image decoding and rasterization backends.

pub mod image_rs_processor;
pub mod orientation;
pub mod processor;
