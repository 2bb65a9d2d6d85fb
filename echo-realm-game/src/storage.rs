//! Key-value persistence seam.
//!
//! Hosts provide the backing store (browser local storage, files, ...). The
//! store only ever writes whole JSON documents under a handful of keys.
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

/// Trait for abstracting document persistence.
/// Platform-specific implementations should provide this
pub trait StateStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written (quota, I/O).
    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// In-memory storage; clones share the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    docs: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.docs.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.docs.borrow_mut().insert(key.to_string(), value.into());
    }
}

impl StateStorage for MemoryStorage {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_documents() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.write("state", "{}").unwrap();
        assert_eq!(view.read("state").unwrap().as_deref(), Some("{}"));
        view.write("state", "[]").unwrap();
        assert_eq!(storage.get("state").as_deref(), Some("[]"));
    }
}
