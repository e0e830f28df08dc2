// In-memory storage backend.
// Used for the session partition and for tests.

use std::collections::BTreeMap;

use crate::cache::lock::RecoveringLock;
use crate::error::Result;

use super::Storage;

/// Storage held entirely in process memory.
#[derive(Debug)]
pub struct MemoryStorage {
    items: RecoveringLock<BTreeMap<String, String>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            items: RecoveringLock::new("storage::memory", BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read("get_raw").get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.items.write("set_raw").insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<()> {
        self.items.write("remove_raw").remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.items.read("list_keys").keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_raw("a", "1").unwrap();
        storage.set_raw("b", "2").unwrap();
        assert_eq!(storage.get_raw("a").unwrap(), Some("1".to_string()));
        assert_eq!(storage.list_keys().unwrap(), vec!["a", "b"]);

        storage.remove_raw("a").unwrap();
        storage.remove_raw("missing").unwrap();
        assert_eq!(storage.get_raw("a").unwrap(), None);
        assert_eq!(storage.len(), 1);
    }
}
