use super::{Collection, Record, RecordKey, Store};
use crate::core::error::StoreError;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A collection backed by one fjall partition. Keys and records are stored
/// as JSON.
pub struct DiskCollection<K, V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: RecordKey, V: Record> DiskCollection<K, V> {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
            _marker: PhantomData,
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl<K: RecordKey, V: Record> Collection<K, V> for DiskCollection<K, V> {
    async fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        match self.partition.get(serde_json::to_vec(key)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: K, value: V) -> Result<(), StoreError> {
        self.partition
            .insert(serde_json::to_vec(&key)?, serde_json::to_vec(&value)?)?;
        self.persist()?;
        debug!("Disk PUT for key: {:?}", key);
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let raw_key = serde_json::to_vec(key)?;
        if !self.partition.contains_key(&raw_key)? {
            return Ok(false);
        }
        self.partition.remove(raw_key)?;
        self.persist()?;
        debug!("Disk REMOVE for key: {:?}", key);
        Ok(true)
    }

    async fn values(&self) -> Result<Vec<V>, StoreError> {
        let mut values = Vec::new();
        for item in self.partition.iter() {
            let (_, bytes) = item?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }
}

/// A store persisted in a fjall keyspace, one partition per collection.
pub struct DiskStore {
    keyspace: Keyspace,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;
        debug!("Opened data store at {}", path.display());
        Ok(Self { keyspace })
    }
}

impl Store for DiskStore {
    fn collection<K: RecordKey, V: Record>(
        &self,
        name: &str,
    ) -> Result<Arc<dyn Collection<K, V>>, StoreError> {
        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?;
        Ok(Arc::new(DiskCollection::<K, V>::new(
            self.keyspace.clone(),
            partition,
        )))
    }
}
