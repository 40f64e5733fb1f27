//! Read-through cache for hierarchical lookups (provinces, districts of a
//! province, exam centers of a district).
//!
//! Entries are loaded lazily on first access for a parent key and stay until
//! explicitly invalidated.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug)]
pub struct LookupCache<K, V> {
    entries: RwLock<HashMap<K, Arc<Vec<V>>>>,
}

impl<K, V> Default for LookupCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached children of `key`, loading them with `load` on a miss.
    ///
    /// A failed load caches nothing.
    pub async fn get_or_load<F, Fut, E>(&self, key: K, load: F) -> Result<Arc<Vec<V>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<V>, E>>,
    {
        if let Some(hit) = self.entries.read().await.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(load().await?);
        let mut entries = self.entries.write().await;
        // Another request may have filled the slot while we were loading.
        let entry = entries.entry(key).or_insert_with(|| Arc::clone(&loaded));
        Ok(Arc::clone(entry))
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
