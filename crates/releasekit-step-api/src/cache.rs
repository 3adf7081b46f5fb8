//! Remote metadata cache with single-flight initialization
//!
//! Field definitions, version lists and similar remote metadata are fetched
//! once per connection and reused across steps of the same build. The cache
//! is an explicit, constructor-injected instance keyed by connection
//! identity; there is no global state.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::StepResult;

/// Cache of loaded metadata values, keyed by connection identity.
///
/// `get_or_load` guarantees the loader runs at most once per key, even under
/// concurrent access: the first caller initializes the per-key cell while
/// later callers await the same initialization.
pub struct MetadataCache<V> {
    entries: DashMap<String, Arc<OnceCell<V>>>,
}

impl<V: Clone> MetadataCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached value for `key`, loading it with `loader` if absent.
    ///
    /// A failed load leaves the cell empty, so a later call retries.
    pub async fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> StepResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = StepResult<V>>,
    {
        let cell = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let value = cell.get_or_try_init(loader).await?;
        Ok(value.clone())
    }

    /// Drops the entry for `key`, forcing a reload on next access.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for MetadataCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
