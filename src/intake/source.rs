use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::candidate::ImageCandidate;

/// Port for a file the user picked.
///
/// Reading the bytes is the first suspension point of the pipeline.
/// Implementations may read from memory, the local filesystem or a
/// platform file handle.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Name as reported by the picker (used for the extension check).
    fn file_name(&self) -> &str;

    /// Declared MIME type.
    fn content_type(&self) -> &str;

    /// Reads the full file contents.
    async fn read(&self) -> Result<Vec<u8>>;
}

/// Reads a [`FileSource`] into an [`ImageCandidate`].
pub async fn load_candidate(source: &dyn FileSource) -> Result<ImageCandidate> {
    let bytes = source
        .read()
        .await
        .with_context(|| format!("read {}", source.file_name()))?;
    Ok(ImageCandidate::new(
        source.file_name(),
        source.content_type(),
        bytes,
    ))
}

/// A file already held in memory.
#[derive(Clone, Debug)]
pub struct MemoryFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    async fn read(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// A file on the local filesystem.
///
/// The content type is guessed from the extension unless set explicitly,
/// the way a browser file picker reports it.
#[derive(Clone, Debug)]
pub struct LocalFile {
    path: PathBuf,
    file_name: String,
    content_type: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            path,
            file_name,
            content_type,
        }
    }

    /// Overrides the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("open {}", self.path.display()))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_file_loads_into_candidate() {
        let src = MemoryFile::new("a.png", "image/png", vec![1u8, 2, 3]);
        let c = load_candidate(&src).await.expect("load");
        assert_eq!(c.file_name(), "a.png");
        assert_eq!(c.content_type(), "image/png");
        assert_eq!(c.len(), 3);
    }

    #[tokio::test]
    async fn local_file_guesses_type_and_reads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Portrait.JPEG");
        std::fs::write(&path, b"abcd").expect("write");

        let src = LocalFile::new(&path);
        assert_eq!(src.content_type(), "image/jpeg");
        assert_eq!(src.file_name(), "Portrait.JPEG");

        let c = load_candidate(&src).await.expect("load");
        assert_eq!(&c.bytes()[..], b"abcd");
    }

    #[tokio::test]
    async fn missing_local_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = LocalFile::new(dir.path().join("gone.png"));
        let err = load_candidate(&src).await.expect_err("should fail");
        assert!(err.to_string().contains("gone.png"));
    }

    #[test]
    fn content_type_override() {
        let src = LocalFile::new("/tmp/photo.txt").with_content_type("image/png");
        assert_eq!(src.content_type(), "image/png");
        assert_eq!(guess_content_type("photo.txt"), "application/octet-stream");
    }
}
