//! # Image Processor Implementation (image-rs)
//!
//! Provides an [`ImageProcessor`] implementation using the [`image`] crate.
//!
//! Decodes **JPEG** and **PNG** input, applies EXIF orientation, and renders
//! crop regions to a fixed-size JPEG using Lanczos3 resampling.
//!
//! # Supported Content Types
//! - `image/jpeg`
//! - `image/jpg`
//! - `image/png`
//!
//! # Example
//! ```rust,no_run
//! use photo_intake::image::image_rs_processor::ImageRsProcessor;
//! use photo_intake::image::processor::{CropRegion, ImageProcessor, RenderOpts};
//!
//! let processor = ImageRsProcessor::default();
//! let img_data = std::fs::read("portrait.png").unwrap();
//!
//! let (w, h) = processor.dimensions(&img_data).expect("decodable");
//! let side = w.min(h);
//! let jpeg = processor
//!     .render_crop(&img_data, CropRegion::new(0, 0, side, side), RenderOpts::new(413, 413, 90))
//!     .expect("render ok");
//! std::fs::write("cropped.jpg", jpeg).unwrap();
//! ```
//!
//! # Errors
//! Returns an [`anyhow::Error`] if:
//! - the image format cannot be guessed or decoded,
//! - encoding the output JPEG fails.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{
    DynamicImage, GenericImageView, ImageReader, codecs::jpeg::JpegEncoder, imageops::FilterType,
};

use super::orientation::apply_exif_orientation;
use super::processor::{CropRegion, ImageProcessor, RenderOpts};

/// A concrete implementation of [`ImageProcessor`] using the `image` crate.
#[derive(Clone, Debug, Default)]
pub struct ImageRsProcessor;

impl ImageRsProcessor {
    /// Returns `true` if the given MIME type is supported.
    pub fn is_supported(&self, content_type: &str) -> bool {
        matches!(
            content_type.to_ascii_lowercase().as_str(),
            "image/jpeg" | "image/jpg" | "image/png"
        )
    }

    /// Decodes the bytes and applies EXIF orientation.
    pub fn decode(&self, img_bytes: &[u8]) -> Result<DynamicImage> {
        let mut img = ImageReader::new(Cursor::new(img_bytes))
            .with_guessed_format()
            .context("guess format")?
            .decode()
            .context("decode image")?;
        apply_exif_orientation(&mut img, img_bytes);
        Ok(img)
    }

    /// Crops, resamples to the exact output size and encodes as JPEG.
    pub fn render_crop(
        &self,
        img_bytes: &[u8],
        region: CropRegion,
        opts: RenderOpts,
    ) -> Result<Vec<u8>> {
        let img = self.decode(img_bytes)?;
        let (w, h) = img.dimensions();
        let r = region.clamp_to(w, h);

        let rendered = img
            .crop_imm(r.x, r.y, r.width, r.height)
            .resize_exact(opts.width, opts.height, FilterType::Lanczos3);

        let rgb = DynamicImage::ImageRgb8(rendered.to_rgb8());
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, opts.quality.clamp(1, 100));
        rgb.write_with_encoder(encoder).context("encode jpeg")?;

        Ok(out)
    }
}

impl ImageProcessor for ImageRsProcessor {
    fn is_supported(&self, content_type: &str) -> bool {
        ImageRsProcessor::is_supported(self, content_type)
    }

    fn dimensions(&self, img_bytes: &[u8]) -> Result<(u32, u32)> {
        Ok(self.decode(img_bytes)?.dimensions())
    }

    fn render_crop(
        &self,
        img_bytes: &[u8],
        region: CropRegion,
        opts: RenderOpts,
    ) -> Result<Vec<u8>> {
        ImageRsProcessor::render_crop(self, img_bytes, region, opts)
    }
}
