//! In-memory media registered through object URLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::types::ObjectUrl;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Shared map from object URL to bytes, readable from the audio thread.
#[derive(Clone, Default)]
pub(crate) struct BlobStore {
    inner: Arc<Mutex<HashMap<ObjectUrl, Arc<[u8]>>>>,
}

impl BlobStore {
    pub(crate) fn create(&self, bytes: Vec<u8>) -> ObjectUrl {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let url = ObjectUrl(format!("blob:tunebox/{id}"));
        if let Ok(mut map) = self.inner.lock() {
            map.insert(url.clone(), Arc::from(bytes));
        }
        url
    }

    pub(crate) fn revoke(&self, url: &ObjectUrl) -> bool {
        self.inner
            .lock()
            .map(|mut map| map.remove(url).is_some())
            .unwrap_or(false)
    }

    pub(crate) fn get(&self, url: &ObjectUrl) -> Option<Arc<[u8]>> {
        self.inner.lock().ok().and_then(|map| map.get(url).cloned())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }
}
