use super::{Collection, Record, RecordKey, Store};
use crate::core::error::StoreError;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection using HashMap and Mutex
pub struct MemoryCollection<K: RecordKey, V: Record> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K: RecordKey, V: Record> MemoryCollection<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: RecordKey, V: Record> Default for MemoryCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: RecordKey, V: Record> Collection<K, V> for MemoryCollection<K, V> {
    async fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let records = self.inner.lock().await;
        Ok(records.get(key).cloned())
    }

    async fn put(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut records = self.inner.lock().await;
        debug!("Memory PUT for key: {:?}", key);
        records.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let mut records = self.inner.lock().await;
        debug!("Memory REMOVE for key: {:?}", key);
        Ok(records.remove(key).is_some())
    }

    async fn values(&self) -> Result<Vec<V>, StoreError> {
        let records = self.inner.lock().await;
        Ok(records.values().cloned().collect())
    }
}

/// A store that keeps every collection in process memory. Nothing survives
/// the process.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn collection<K: RecordKey, V: Record>(
        &self,
        name: &str,
    ) -> Result<Arc<dyn Collection<K, V>>, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let entry = collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryCollection::<K, V>::new()) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        entry
            .downcast::<MemoryCollection<K, V>>()
            .map(|collection| collection as Arc<dyn Collection<K, V>>)
            .map_err(|_| {
                StoreError::Backend(format!(
                    "collection {name} was opened with a different record type"
                ))
            })
    }
}
