//! Read access to the shared key-value store holding container state.

use std::collections::BTreeMap;

use navy_common::error::Result;
use serde_json::Value;

/// Source of desired/actual state documents.
///
/// Implementations must surface transport failures as errors; an absent
/// key is `Ok(None)`.
pub trait StateStore {
    /// Fetches the JSON document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or the stored value
    /// is not valid JSON.
    fn get_json(&self, key: &str) -> Result<Option<Value>>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn get_json(&self, key: &str) -> Result<Option<Value>> {
        (**self).get_json(key)
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, Value>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous document.
    pub fn set_json(&mut self, key: impl Into<String>, value: Value) {
        let _ = self.documents.insert(key.into(), value);
    }

    /// Removes the document under `key`.
    pub fn remove(&mut self, key: &str) {
        let _ = self.documents.remove(key);
    }
}

impl StateStore for MemoryStore {
    fn get_json(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(key).cloned())
    }
}
