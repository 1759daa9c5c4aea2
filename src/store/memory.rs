use std::collections::HashMap;
use std::sync::RwLock;

use super::{Collection, StorageBackend, StoreError};

/// Documents kept in process memory. Used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryBackend {
    docs: RwLock<HashMap<Collection, String>>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self, collection: Collection) -> Result<Option<String>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(|p| p.into_inner());
        Ok(docs.get(&collection).cloned())
    }

    fn write(&self, collection: Collection, contents: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap_or_else(|p| p.into_inner());
        docs.insert(collection, contents.to_string());
        Ok(())
    }
}
