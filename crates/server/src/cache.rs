//! Cached view payloads keyed by their path.
//!
//! Handlers that render a view may store the payload here; writes that change
//! the underlying data call [`Revalidate::invalidate`] so the next read
//! recomputes it.
//!
//! A fill takes a [`PageCache::generation`] before reading the data and hands
//! it back to [`PageCache::insert_if_fresh`]. Any invalidation in between bumps
//! the generation and the stale payload is not stored.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;

/// Marks the cached data of a view path as stale.
pub trait Revalidate: Send + Sync {
    fn invalidate(&self, path: &str);
}

#[derive(Debug, Default)]
struct Entries {
    pages: HashMap<String, Arc<Value>>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct PageCache {
    entries: RwLock<Entries>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<Value>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pages
            .get(path)
            .cloned()
    }

    /// Current generation, bumped by every invalidation.
    pub fn generation(&self) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Store `payload` for `path` unless an invalidation happened since
    /// `generation` was read. The payload is returned either way.
    pub fn insert_if_fresh(&self, path: &str, generation: u64, payload: Value) -> Arc<Value> {
        let payload = Arc::new(payload);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.generation == generation {
            entries.pages.insert(path.to_string(), Arc::clone(&payload));
        } else {
            tracing::debug!("skipped stale fill of {path}");
        }
        payload
    }
}

impl Revalidate for PageCache {
    fn invalidate(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.generation = entries.generation.wrapping_add(1);
        if entries.pages.remove(path).is_some() {
            tracing::debug!("revalidated {path}");
        }
    }
}
