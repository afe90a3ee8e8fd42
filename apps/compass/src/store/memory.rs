use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{StorageBackend, StorageError};

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
