//! Single-entry result cache
//!
//! Each derivation keeps exactly one retained entry, keyed by value
//! equality of its inputs (never by identity):
//! - same key again: stored result returned, no recomputation
//! - different key: entry replaced
//! - disabled: always recompute, identical results
//!
//! Statistics are passive and never influence caching.

use serde::Serialize;

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the retained entry
    pub hits: u64,
    /// Lookups that ran the computation
    pub misses: u64,
}

/// Memoizes the last call of a derivation
#[derive(Debug)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    enabled: bool,
    stats: CacheStats,
}

impl<K: PartialEq + Clone, V: Clone> Memo<K, V> {
    /// Create an empty, enabled memo
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Create an empty memo; a disabled memo never retains an entry
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            entry: None,
            enabled,
            stats: CacheStats::default(),
        }
    }

    /// Return the result for `key`, computing and retaining it on a miss.
    ///
    /// A failed computation leaves the previous entry untouched.
    pub fn get_or_try_compute<E, F>(&mut self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some((cached_key, value)) = &self.entry {
            if cached_key == key {
                self.stats.hits += 1;
                return Ok(value.clone());
            }
        }

        self.stats.misses += 1;
        let value = compute()?;
        if self.enabled {
            self.entry = Some((key.clone(), value.clone()));
        }
        Ok(value)
    }

    /// Key of the retained entry, if any
    pub fn cached_key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    /// Whether the memo retains entries
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop the retained entry (explicit invalidation)
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

impl<K: PartialEq + Clone, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
