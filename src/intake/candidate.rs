use std::sync::Arc;

/// A file as picked by the user, before any validation.
///
/// Bytes are shared so validation and rasterization jobs can hold them
/// without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageCandidate {
    file_name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImageCandidate {
    /// # Example
    /// ```
    /// use photo_intake::intake::candidate::ImageCandidate;
    ///
    /// let c = ImageCandidate::new("Me.JPG", "image/jpeg", vec![0u8; 10]);
    /// assert_eq!(c.len(), 10);
    /// assert_eq!(c.extension().as_deref(), Some("jpg"));
    /// ```
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// Byte length of the file.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased extension after the last dot of the file name.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.trim().rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }
}
