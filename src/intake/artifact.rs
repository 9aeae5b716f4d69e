use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::preview::PreviewHandle;
use super::validator::OUTPUT_CONTENT_TYPE;
use crate::error::validation::kb;

/// The final fixed-size photo, ready for upload or PDF embedding.
///
/// Only constructed by the photo field after post-crop validation passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CroppedArtifact {
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
    quality: u8,
    preview: PreviewHandle,
}

impl CroppedArtifact {
    pub(crate) fn new(
        bytes: Arc<[u8]>,
        (width, height): (u32, u32),
        quality: u8,
        preview: PreviewHandle,
    ) -> Self {
        Self {
            bytes,
            width,
            height,
            quality,
            preview,
        }
    }

    /// Encoded JPEG bytes.
    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        OUTPUT_CONTENT_TYPE
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encoder quality on the `1..=100` scale.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Size in kilobytes, rounded, for display.
    pub fn size_kb(&self) -> u64 {
        kb(&(self.bytes.len() as u64))
    }

    /// Status line shown once the crop is accepted.
    pub fn success_message(&self) -> String {
        format!("Photo cropped successfully ({} KB)", self.size_kb())
    }

    /// `data:` URL for renderers that embed images inline (e.g. ID-card PDFs).
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            OUTPUT_CONTENT_TYPE,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::preview::{InMemoryPreviewStore, PreviewStore};

    fn artifact(len: usize) -> CroppedArtifact {
        let bytes: Arc<[u8]> = Arc::from(vec![0xABu8; len]);
        let store = InMemoryPreviewStore::default();
        let preview = store.create(bytes.clone(), OUTPUT_CONTENT_TYPE);
        CroppedArtifact::new(bytes, (413, 531), 90, preview)
    }

    #[test]
    fn size_kb_is_rounded() {
        assert_eq!(artifact(1536).size_kb(), 2);
        assert_eq!(artifact(1535).size_kb(), 1);
        assert_eq!(artifact(100 * 1024).success_message(), "Photo cropped successfully (100 KB)");
    }

    #[test]
    fn data_url_is_base64_jpeg() {
        let a = artifact(3);
        assert_eq!(a.to_data_url(), "data:image/jpeg;base64,q6ur");
        assert_eq!(a.content_type(), "image/jpeg");
        assert_eq!(a.dimensions(), (413, 531));
        assert_eq!(a.quality(), 90);
    }
}
