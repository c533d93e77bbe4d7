//! In-memory object URLs
//!
//! Staged previews and generation results are addressed by `blob:restyle/<n>`
//! URIs. Each URI is owned by an [`ObjectUrl`] handle and its bytes stay
//! registered in the [`BlobStore`] exactly as long as the handle lives.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const URI_PREFIX: &str = "blob:restyle/";

struct BlobEntry {
    bytes: Arc<[u8]>,
    media_type: String,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<String, BlobEntry>,
}

/// Registry of live object URLs
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<Registry>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and hand back the owning handle
    pub fn create(&self, bytes: Vec<u8>, media_type: &str) -> ObjectUrl {
        let bytes: Arc<[u8]> = bytes.into();
        let mut registry = self.inner.lock();
        registry.next_id += 1;
        let uri = format!("{}{}", URI_PREFIX, registry.next_id);
        registry.entries.insert(
            uri.clone(),
            BlobEntry {
                bytes: Arc::clone(&bytes),
                media_type: media_type.to_string(),
            },
        );
        tracing::debug!(%uri, size = bytes.len(), media_type, "object url created");

        ObjectUrl {
            uri,
            bytes,
            media_type: media_type.to_string(),
            store: Arc::clone(&self.inner),
        }
    }

    /// Look up the bytes behind a URI, if it is still live
    pub fn resolve(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.inner.lock().entries.get(uri).map(|e| Arc::clone(&e.bytes))
    }

    pub fn media_type(&self, uri: &str) -> Option<String> {
        self.inner.lock().entries.get(uri).map(|e| e.media_type.clone())
    }

    /// Number of URIs currently holding bytes
    pub fn live_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owning handle for one object URL; dropping it releases the URI
pub struct ObjectUrl {
    uri: String,
    bytes: Arc<[u8]>,
    media_type: String,
    store: Arc<Mutex<Registry>>,
}

impl ObjectUrl {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.store.lock().entries.remove(&self.uri).is_some() {
            tracing::debug!(uri = %self.uri, "object url released");
        }
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("uri", &self.uri)
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}
