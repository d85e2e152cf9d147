//! Storage backends for alias records.

pub mod memory;
pub mod mysql;
pub mod redis;

pub use burrow_core::repository::{AliasRecord, NewAlias, Repository, Result};
pub use burrow_core::StorageError;
pub use memory::InMemoryRepository;
pub use self::mysql::MySqlRepository;
pub use self::redis::RedisRepository;
