//! Path → owning package cache
//!
//! Entries are never invalidated. A later, more specific match for the same
//! path overwrites the stored location, and a positive match may replace a
//! cached "no package".

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::path;

/// Statistics about cache performance
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Total number of entries in cache
    pub entries: usize,
    /// Number of materialized packages
    pub packages: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoized path resolutions
#[derive(Default)]
pub struct PathCache {
    /// path -> owning location, `None` when no package owns the path
    entries: DashMap<String, Option<String>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution for `path`
    ///
    /// The outer `Option` is the cache lookup, the inner one the owner.
    pub fn get(&self, path: &str) -> Option<Option<String>> {
        match self.entries.get(path) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Records the owner of `path`, replacing any previous entry
    pub fn insert(&self, path: &str, location: Option<&str>) {
        self.entries
            .insert(path.to_string(), location.map(str::to_string));
    }

    /// Records `location` as the owner of `path` unless a package below
    /// `location` already owns it
    pub fn insert_unless_deeper(&self, path: &str, location: &str) {
        self.entries
            .entry(path.to_string())
            .and_modify(|owner| {
                if !matches!(owner.as_deref(), Some(existing) if path::is_ancestor(location, existing)) {
                    *owner = Some(location.to_string());
                }
            })
            .or_insert_with(|| Some(location.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current statistics; `packages` is left for the caller to fill
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
            packages: 0,
        }
    }
}
