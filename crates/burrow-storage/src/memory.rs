use async_trait::async_trait;
use burrow_core::repository::{AliasRecord, NewAlias, Repository, Result};
use burrow_core::{ShortCode, StorageError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Inserts go through the entry API and increments
/// hold the shard write lock, so both are atomic per code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ShortCode, AliasRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, code: &ShortCode, alias: NewAlias) -> Result<()> {
        match self.storage.entry(code.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(alias.into_record(code.clone()));
                Ok(())
            }
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<AliasRecord>> {
        Ok(self.storage.get(code).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.remove(code).is_some())
    }

    async fn increment_usage(&self, code: &ShortCode) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(code) else {
            return Ok(false);
        };
        entry.usage_count = entry.usage_count.saturating_add(1);
        Ok(true)
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64> {
        let before = self.storage.len();
        self.storage.retain(|_, record| record.expires_at > cutoff);
        Ok(before.saturating_sub(self.storage.len()) as u64)
    }
}
