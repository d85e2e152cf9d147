use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored alias record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// The short code identifying the alias.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub target: String,
    /// When the alias was created.
    pub created_at: Timestamp,
    /// When the alias stops resolving.
    pub expires_at: Timestamp,
    /// Number of successful resolutions.
    pub usage_count: u64,
}

impl AliasRecord {
    /// Returns `true` once `now` has reached the expiration deadline.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// The fields supplied when creating a record. The usage count always starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlias {
    pub target: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl NewAlias {
    /// Turns the new alias into the record a backend stores for `code`.
    pub fn into_record(self, code: ShortCode) -> AliasRecord {
        AliasRecord {
            code,
            target: self.target,
            created_at: self.created_at,
            expires_at: self.expires_at,
            usage_count: 0,
        }
    }
}

/// Persistence contract for alias records.
///
/// Backends store and return timestamps but never decide whether a record
/// has expired; that is left to the service. The only time-aware operation is
/// [`Repository::purge_expired`], whose cutoff is chosen by the caller.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new record with a zero usage count.
    ///
    /// Returns `Err(StorageError::Conflict)` if any record already exists for
    /// the code, expired or not. Existing records are never overwritten.
    async fn save(&self, code: &ShortCode, alias: NewAlias) -> Result<()>;

    /// Retrieves the record for a code, including expired ones.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<AliasRecord>>;

    /// Deletes the record for a code.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Atomically adds one to the usage count of a code.
    /// Returns `false` if the code does not exist.
    async fn increment_usage(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes every record whose deadline is at or before `cutoff`
    /// and returns how many were removed.
    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64>;
}
