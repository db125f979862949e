//! Key-value persistence for the ledger, budgets and profile blobs.
//!
//! Every value is a serialized JSON string stored under a well-known key.

use std::collections::HashMap;

use crate::error::Result;

pub mod budget_repository;
pub mod connection;
pub mod profile_repository;
pub mod repository;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BUDGETS_KEY: &str = "budgets";
pub const USER_DATA_KEY: &str = "userData";

/// String key to string value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Volatile store, used for tests and `--in-memory` runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("transactions").unwrap(), None);

        store.set("transactions", "[]").unwrap();
        assert_eq!(store.get("transactions").unwrap().as_deref(), Some("[]"));

        store.set("transactions", "[1]").unwrap();
        assert_eq!(store.get("transactions").unwrap().as_deref(), Some("[1]"));

        store.remove("transactions").unwrap();
        assert_eq!(store.get("transactions").unwrap(), None);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("budgets", "{}").unwrap();
        assert_eq!(store.get("budgets").unwrap().as_deref(), Some("{}"));
    }
}
