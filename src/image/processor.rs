//! # Image Processing Abstractions
//!
//! Defines the backend interface the photo pipeline uses for decoding and
//! rasterizing images.
//!
//! This module provides:
//! - [`CropRegion`] — a rectangle in source-pixel coordinates.
//! - [`RenderOpts`] — the fixed output raster and encoder quality.
//! - [`ImageProcessor`] — a trait abstraction over image backends
//!   (e.g. `image-rs`, or a test double).
//!
//! # Example
//! ```rust
//! use photo_intake::image::processor::{CropRegion, ImageProcessor, RenderOpts};
//! use anyhow::Result;
//!
//! struct FixedProcessor;
//!
//! impl ImageProcessor for FixedProcessor {
//!     fn is_supported(&self, content_type: &str) -> bool {
//!         content_type == "image/jpeg"
//!     }
//!
//!     fn dimensions(&self, _img_bytes: &[u8]) -> Result<(u32, u32)> {
//!         Ok((1000, 1000))
//!     }
//!
//!     fn render_crop(&self, _img_bytes: &[u8], _region: CropRegion, _opts: RenderOpts) -> Result<Vec<u8>> {
//!         Ok(vec![0xFF, 0xD8, 0xFF])
//!     }
//! }
//!
//! let p = FixedProcessor;
//! assert_eq!(p.dimensions(b"").unwrap(), (1000, 1000));
//! ```

use anyhow::Result;

/// A rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamps the region inside a `img_w × img_h` image, keeping it at least 1×1.
    pub fn clamp_to(self, img_w: u32, img_h: u32) -> Self {
        let x = self.x.min(img_w.saturating_sub(1));
        let y = self.y.min(img_h.saturating_sub(1));
        let width = self.width.clamp(1, (img_w - x).max(1));
        let height = self.height.clamp(1, (img_h - y).max(1));
        Self::new(x, y, width, height)
    }
}

/// Output raster size and JPEG quality (`1..=100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOpts {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl RenderOpts {
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }
}

/// Backend operations needed by the photo pipeline.
///
/// Dimensions are reported after orientation correction, so crop regions and
/// dimensions always refer to the image as a user sees it.
pub trait ImageProcessor: Send + Sync {
    /// Returns `true` if the given MIME content type can be decoded.
    fn is_supported(&self, content_type: &str) -> bool;

    /// Fully decodes the image and returns its `(width, height)`.
    ///
    /// Fails for corrupt or truncated input.
    fn dimensions(&self, img_bytes: &[u8]) -> Result<(u32, u32)>;

    /// Crops `region` out of the image, resamples it to exactly
    /// `opts.width × opts.height` and encodes it as JPEG.
    fn render_crop(&self, img_bytes: &[u8], region: CropRegion, opts: RenderOpts)
    -> Result<Vec<u8>>;
}
