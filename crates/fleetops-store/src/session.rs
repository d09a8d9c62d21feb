//! The session-scoped keyed store contract
//!
//! The cache only ever needs three operations from its backing store. The
//! in-memory implementation here is what production uses for a process
//! session; tests use it too.

use dashmap::DashMap;
use fleetops_types::{ReferenceItem, ReferenceKey};

/// A keyed store living for one session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: ReferenceKey) -> Option<Vec<ReferenceItem>>;
    fn set(&self, key: ReferenceKey, items: Vec<ReferenceItem>);
    fn clear(&self, key: ReferenceKey);
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<ReferenceKey, Vec<ReferenceItem>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemoryStore {
    fn get(&self, key: ReferenceKey) -> Option<Vec<ReferenceItem>> {
        self.entries.get(&key).map(|items| items.clone())
    }

    fn set(&self, key: ReferenceKey, items: Vec<ReferenceItem>) {
        self.entries.insert(key, items);
    }

    fn clear(&self, key: ReferenceKey) {
        self.entries.remove(&key);
    }
}
