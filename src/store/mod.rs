pub mod disk;
pub mod memory;

use crate::core::error::StoreError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

pub use disk::DiskStore;
pub use memory::MemoryStore;

pub trait RecordKey:
    Eq + Hash + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> RecordKey for T where
    T: Eq + Hash + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A named set of records addressed by key.
#[async_trait]
pub trait Collection<K: RecordKey, V: Record>: Send + Sync {
    async fn get(&self, key: &K) -> Result<Option<V>, StoreError>;

    /// Inserts or replaces the record stored under `key`.
    async fn put(&self, key: K, value: V) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn remove(&self, key: &K) -> Result<bool, StoreError>;

    /// All records, in no particular order.
    async fn values(&self) -> Result<Vec<V>, StoreError>;
}

/// A backend able to hand out collections by name. Opening the same name
/// twice yields views over the same records.
pub trait Store: Send + Sync {
    fn collection<K: RecordKey, V: Record>(
        &self,
        name: &str,
    ) -> Result<Arc<dyn Collection<K, V>>, StoreError>;
}
