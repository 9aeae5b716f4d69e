//! # Preview Handles
//!
//! A preview handle is a transient, revocable URL used to display a cropped
//! photo without re-reading its bytes, in the manner of a browser object URL.
//! Every handle that is created must eventually be revoked; the photo field
//! revokes on replace, clear and drop.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use photo_intake::intake::preview::{InMemoryPreviewStore, PreviewStore};
//!
//! let store = InMemoryPreviewStore::default();
//! let handle = store.create(Arc::from(&b"jpeg"[..]), "image/jpeg");
//! assert!(handle.url().starts_with("blob:photo-intake/"));
//! assert_eq!(store.live_count(), 1);
//!
//! assert!(store.revoke(&handle));
//! assert!(!store.revoke(&handle));
//! assert_eq!(store.live_count(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// URL scheme prefix of issued handles.
pub const PREVIEW_URL_PREFIX: &str = "blob:photo-intake/";

/// A revocable display reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    url: String,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Issues and revokes preview handles.
pub trait PreviewStore: Send + Sync {
    /// Registers bytes for display and returns a fresh handle.
    fn create(&self, bytes: Arc<[u8]>, content_type: &str) -> PreviewHandle;

    /// Releases a handle. Returns `false` if it was already revoked.
    fn revoke(&self, handle: &PreviewHandle) -> bool;
}

#[derive(Clone, Debug)]
struct PreviewEntry {
    content_type: String,
    bytes: Arc<[u8]>,
}

/// Process-local store keyed by `blob:` URLs.
#[derive(Debug, Default)]
pub struct InMemoryPreviewStore {
    entries: Mutex<HashMap<String, PreviewEntry>>,
}

impl InMemoryPreviewStore {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, PreviewEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of handles not yet revoked.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// Looks up the bytes and content type behind a URL.
    pub fn resolve(&self, url: &str) -> Option<(String, Arc<[u8]>)> {
        self.entries()
            .get(url)
            .map(|e| (e.content_type.clone(), e.bytes.clone()))
    }
}

impl PreviewStore for InMemoryPreviewStore {
    fn create(&self, bytes: Arc<[u8]>, content_type: &str) -> PreviewHandle {
        let url = format!("{PREVIEW_URL_PREFIX}{}", Uuid::new_v4());
        self.entries().insert(
            url.clone(),
            PreviewEntry {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        PreviewHandle { url }
    }

    fn revoke(&self, handle: &PreviewHandle) -> bool {
        self.entries().remove(&handle.url).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_resolvable() {
        let store = InMemoryPreviewStore::default();
        let bytes: Arc<[u8]> = Arc::from(vec![1u8, 2, 3]);

        let a = store.create(bytes.clone(), "image/jpeg");
        let b = store.create(bytes.clone(), "image/jpeg");
        assert_ne!(a, b);

        let (ct, resolved) = store.resolve(a.url()).expect("live");
        assert_eq!(ct, "image/jpeg");
        assert!(Arc::ptr_eq(&resolved, &bytes));
    }

    #[test]
    fn revoked_handles_no_longer_resolve() {
        let store = InMemoryPreviewStore::default();
        let h = store.create(Arc::from(vec![9u8]), "image/jpeg");
        assert!(store.revoke(&h));
        assert!(store.resolve(h.url()).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn store_is_usable_as_trait_object() {
        let store: Arc<dyn PreviewStore> = Arc::new(InMemoryPreviewStore::default());
        let h = store.create(Arc::from(vec![0u8]), "image/jpeg");
        assert!(store.revoke(&h));
    }
}
