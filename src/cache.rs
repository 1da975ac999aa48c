use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::record::FileRecord;

/// Default entry capacity of [`LruStorageCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Capability contract for pluggable storage caches.
///
/// The cache maps a generated filename to its [`FileRecord`]. A single
/// instance is shared across all in-flight requests, so every operation takes
/// `&self` and implementations must be safe under concurrent use. Substituting
/// an implementation that misses one of the five operations is rejected at
/// compile time, which is the eager structural validation this seam requires.
pub trait StorageCache: Send + Sync + fmt::Debug {
    /// Returns the record stored under `key`, refreshing its recency.
    fn get(&self, key: &str) -> Option<FileRecord>;

    /// Returns whether `key` is currently cached, without touching recency.
    fn has(&self, key: &str) -> bool;

    /// Stores `record` under `key`, replacing any previous entry.
    fn set(&self, key: &str, record: FileRecord);

    /// Removes the entry for `key`, if present.
    fn del(&self, key: &str);

    /// Returns all currently cached keys.
    fn keys(&self) -> Vec<String>;
}

/// Default [`StorageCache`] bounded by least-recently-used eviction.
///
/// `get` and `set` both count as a use and refresh recency. Once the entry
/// count exceeds capacity, the least recently used entry is dropped silently.
/// Eviction never deletes the backing file: cache occupancy is a memory
/// concern, not a storage-lifecycle decision.
pub struct LruStorageCache {
    inner: Mutex<LruCache<String, FileRecord>>,
}

impl LruStorageCache {
    /// Creates a cache bounded to `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, FileRecord>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LruStorageCache {
    fn default() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity)
    }
}

impl fmt::Debug for LruStorageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        f.debug_struct("LruStorageCache")
            .field("len", &guard.len())
            .field("capacity", &guard.cap())
            .finish()
    }
}

impl StorageCache for LruStorageCache {
    fn get(&self, key: &str) -> Option<FileRecord> {
        self.lock().get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    fn set(&self, key: &str, record: FileRecord) {
        self.lock().put(key.to_owned(), record);
    }

    fn del(&self, key: &str) {
        self.lock().pop(key);
    }

    fn keys(&self) -> Vec<String> {
        self.lock().iter().map(|(key, _)| key.clone()).collect()
    }
}
