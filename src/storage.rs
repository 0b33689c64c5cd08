/// Key-value persistence for tracker state (chrome.storage.local in the
/// extension, memory in tests)
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// The two blobs the tracker persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Open tab records, a JSON object keyed by tab id
    OpenTabs,
    /// Archived closed tab records, a JSON array oldest first
    ClosedTabs,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::OpenTabs => "tabData",
            StorageKey::ClosedTabs => "tabHistory",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage backend rejected the read or write
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize {key}: {source}")]
    Deserialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Asynchronous blob store. `set` writes all of its entries in one call.
#[allow(async_fn_in_trait)]
pub trait TabStore {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StoreError>;

    async fn set(&self, entries: Vec<(StorageKey, Value)>) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<HashMap<StorageKey, Value>>>,
    writes: Rc<RefCell<Vec<Vec<StorageKey>>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: StorageKey) -> Option<Value> {
        self.data.borrow().get(&key).cloned()
    }

    pub fn insert(&self, key: StorageKey, value: Value) {
        self.data.borrow_mut().insert(key, value);
    }

    /// Keys written by each successful `set`, in call order
    pub fn writes(&self) -> Vec<Vec<StorageKey>> {
        self.writes.borrow().clone()
    }

    /// Make every following `set` fail with a backend error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TabStore for MemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StoreError> {
        Ok(self.value(key))
    }

    async fn set(&self, entries: Vec<(StorageKey, Value)>) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Backend("write rejected".to_string()));
        }

        let keys = entries.iter().map(|(key, _)| *key).collect();
        self.data.borrow_mut().extend(entries);
        self.writes.borrow_mut().push(keys);
        Ok(())
    }
}
