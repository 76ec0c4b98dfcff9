use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Thread-safe LRU cache for chunk embeddings
///
/// Keyed by chunk text; files that share boilerplate (headers, templates)
/// produce identical chunks, and cached vectors skip the embeddings API call.
pub struct EmbeddingCache {
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a new embedding cache with the specified capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("Cache capacity must be at least 1");

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Get a cached embedding for a chunk text.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.cache.lock().unwrap().get(text).cloned()
    }

    /// Store an embedding in the cache.
    pub fn put(&self, text: String, embedding: Vec<f32>) {
        self.cache.lock().unwrap().put(text, embedding);
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }
}
