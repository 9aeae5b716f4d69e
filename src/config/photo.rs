//! # Photo Policy
//!
//! Per-call-site parameters for the photo intake pipeline: size bounds before
//! and after cropping, the fixed output raster, the crop aspect ratio and the
//! JPEG quality factor.
//!
//! Three presets exist because the registration flows use different bounds:
//!
//! | Preset | Output | Pre-crop bytes | Post-crop bytes |
//! |--------|--------|----------------|-----------------|
//! | [`PhotoPolicy::passport`] | 413×531 | 30 KB – 300 KB | 30 KB – 300 KB |
//! | [`PhotoPolicy::square`] | 413×413 | 15 KB – 2 MB | 15 KB – 2 MB |
//! | [`PhotoPolicy::open_ended`] | 413×531 | ≤ 5 MB | ≤ 5 MB |
//!
//! # Example
//! ```rust
//! use photo_intake::config::photo::PhotoPolicy;
//!
//! let p = PhotoPolicy::passport();
//! assert_eq!(p.target_dimensions(), (413, 531));
//! assert!(p.pre_crop.contains(30 * 1024));
//! assert!(!p.pre_crop.contains(30 * 1024 - 1));
//! ```

use serde::Serialize;

use crate::config::env::{read_f32_from, read_opt_u64_from, read_u32_from, read_u64_from};

/// One kibibyte, the unit used by every size message.
pub const KB: u64 = 1024;

/// Inclusive byte-length bounds. A missing minimum means "no lower bound".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SizeBounds {
    pub min_bytes: Option<u64>,
    pub max_bytes: u64,
}

impl SizeBounds {
    pub const fn new(min_bytes: Option<u64>, max_bytes: u64) -> Self {
        Self {
            min_bytes,
            max_bytes,
        }
    }

    /// Builds bounds from kilobyte values, saturating at `u64::MAX` bytes.
    pub const fn kb(min_kb: Option<u64>, max_kb: u64) -> Self {
        let min_bytes = match min_kb {
            Some(kb) => Some(kb.saturating_mul(KB)),
            None => None,
        };
        Self::new(min_bytes, max_kb.saturating_mul(KB))
    }

    /// Returns `true` when `len` lies within the bounds (both ends inclusive).
    pub fn contains(&self, len: u64) -> bool {
        self.min_bytes.is_none_or(|min| len >= min) && len <= self.max_bytes
    }
}

/// Parameters injected by each call site.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhotoPolicy {
    /// Bounds for the file as selected.
    pub pre_crop: SizeBounds,
    /// Bounds for the encoded crop output. Same or stricter than `pre_crop`.
    pub post_crop: SizeBounds,
    /// Output raster width in pixels.
    pub target_width: u32,
    /// Output raster height in pixels.
    pub target_height: u32,
    /// Crop box width / height.
    pub aspect_ratio: f64,
    /// JPEG quality in `(0.0, 1.0]`.
    pub jpeg_quality: f32,
}

impl PhotoPolicy {
    /// Strict passport photo: 413×531, 30–300 KB.
    pub fn passport() -> Self {
        let bounds = SizeBounds::kb(Some(30), 300);
        Self::with_target(413, 531, bounds, bounds)
    }

    /// Lenient square photo: 413×413, 15 KB–2 MB.
    pub fn square() -> Self {
        let bounds = SizeBounds::kb(Some(15), 2 * 1024);
        Self::with_target(413, 413, bounds, bounds)
    }

    /// Passport framing with no minimum and a 5 MB ceiling.
    pub fn open_ended() -> Self {
        let bounds = SizeBounds::kb(None, 5 * 1024);
        Self::with_target(413, 531, bounds, bounds)
    }

    /// Builds a policy whose aspect ratio follows the target raster, at quality 0.9.
    pub fn with_target(
        target_width: u32,
        target_height: u32,
        pre_crop: SizeBounds,
        post_crop: SizeBounds,
    ) -> Self {
        Self {
            pre_crop,
            post_crop,
            target_width,
            target_height,
            aspect_ratio: f64::from(target_width) / f64::from(target_height.max(1)),
            jpeg_quality: 0.9,
        }
    }

    /// Applies `{prefix}_{MIN_KB,MAX_KB,POST_MIN_KB,POST_MAX_KB,WIDTH,HEIGHT,QUALITY}`
    /// overrides on top of `base`.
    ///
    /// `MIN_KB`/`MAX_KB` set both stages; `POST_*` then narrow the post-crop stage.
    /// A `MIN_KB` of `none` removes the lower bound.
    ///
    /// # Example
    /// ```rust
    /// use photo_intake::config::photo::PhotoPolicy;
    ///
    /// let p = PhotoPolicy::from_provider(
    ///     |k| (k == "PHOTO_SQUARE_WIDTH").then(|| "600".into()),
    ///     "PHOTO_SQUARE",
    ///     PhotoPolicy::square(),
    /// );
    /// assert_eq!(p.target_width, 600);
    /// ```
    pub fn from_provider<F>(provider: F, prefix: &str, base: Self) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |suffix: &str| format!("{prefix}_{suffix}");
        let to_kb = |bytes: u64| bytes / KB;

        let min_kb = read_opt_u64_from(&provider, &key("MIN_KB"), base.pre_crop.min_bytes.map(to_kb));
        let max_kb = read_u64_from(&provider, &key("MAX_KB"), to_kb(base.pre_crop.max_bytes));
        let pre_crop = SizeBounds::kb(min_kb, max_kb);

        let post_min_kb = read_opt_u64_from(&provider, &key("POST_MIN_KB"), min_kb);
        let post_max_kb = read_u64_from(&provider, &key("POST_MAX_KB"), max_kb);
        let post_crop = SizeBounds::kb(post_min_kb, post_max_kb);

        let width = read_u32_from(&provider, &key("WIDTH"), base.target_width).max(1);
        let height = read_u32_from(&provider, &key("HEIGHT"), base.target_height).max(1);

        let quality = read_f32_from(&provider, &key("QUALITY"), base.jpeg_quality);
        let jpeg_quality = if quality > 0.0 && quality <= 1.0 {
            quality
        } else {
            base.jpeg_quality
        };

        Self {
            jpeg_quality,
            ..Self::with_target(width, height, pre_crop, post_crop)
        }
    }

    /// The fixed output raster as `(width, height)`.
    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Quality factor mapped onto the encoder's `1..=100` scale.
    pub fn quality_percent(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}
