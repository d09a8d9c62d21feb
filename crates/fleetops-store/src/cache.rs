//! Reference Data Cache
//!
//! Populate-on-miss, then immutable for the session. Two callers missing
//! the same key at once converge on a single stored value: whoever stores
//! first wins, and the later fetch result is discarded in favor of the
//! stored one. Invalidation is always explicit.

use crate::SessionStore;
use fleetops_types::{ReferenceItem, ReferenceKey, WorkflowResult};
use std::future::Future;
use std::sync::Arc;

/// Session cache over the lookup lists every orchestrator reads.
#[derive(Clone)]
pub struct ReferenceCache {
    store: Arc<dyn SessionStore>,
}

impl ReferenceCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Read a cached list, without populating.
    pub fn get(&self, key: ReferenceKey) -> Option<Vec<ReferenceItem>> {
        self.store.get(key)
    }

    /// Read a list, fetching and storing it on first miss. Concurrent
    /// misses may fetch more than once, but all converge on the first
    /// stored value — no torn state.
    pub async fn get_or_populate<F, Fut>(
        &self,
        key: ReferenceKey,
        fetch: F,
    ) -> WorkflowResult<Vec<ReferenceItem>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WorkflowResult<Vec<ReferenceItem>>>,
    {
        if let Some(items) = self.store.get(key) {
            return Ok(items);
        }

        let fetched = fetch().await?;

        // Someone else may have populated the key while we were fetching;
        // their value is the session's value.
        if let Some(items) = self.store.get(key) {
            return Ok(items);
        }
        self.store.set(key, fetched.clone());
        Ok(fetched)
    }

    /// Drop one key; the next read repopulates it. This is the only way a
    /// cached list changes within a session.
    pub fn invalidate(&self, key: ReferenceKey) {
        self.store.clear(key);
    }

    /// Look an item up by id in a cached list.
    pub fn find(&self, key: ReferenceKey, id: u32) -> Option<ReferenceItem> {
        self.store
            .get(key)?
            .into_iter()
            .find(|item| item.id == id)
    }
}
