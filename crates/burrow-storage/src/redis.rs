use async_trait::async_trait;
use burrow_core::repository::{AliasRecord, NewAlias, Repository, Result};
use burrow_core::{ShortCode, StorageError};
use jiff::Timestamp;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "burrow:alias:";

// Insert-if-absent. The key gets a native deadline so Redis reclaims it on its own.
const SAVE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1],
  'target', ARGV[1],
  'created_at', ARGV[2],
  'expires_at', ARGV[3],
  'usage_count', 0)
redis.call('PEXPIREAT', KEYS[1], ARGV[3])
return 1
"#;

// HINCRBY alone would resurrect a deleted key as a bare counter.
const INCREMENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return -1
end
return redis.call('HINCRBY', KEYS[1], 'usage_count', 1)
"#;

/// Redis implementation of the repository contract.
///
/// Each alias is a hash under `{key_prefix}{code}` with the fields `target`,
/// `created_at`, `expires_at` (Unix milliseconds) and `usage_count`. Save and
/// increment run as Lua scripts so the existence check and the write happen
/// atomically on the server.
#[derive(Clone)]
pub struct RedisRepository {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    save_script: redis::Script,
    increment_script: redis::Script,
}

impl std::fmt::Debug for RedisRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRepository")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        StorageError::Timeout(message)
    } else if err.is_io_error() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

fn field<'a>(hash: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    hash.get(name)
        .map(String::as_str)
        .ok_or_else(|| StorageError::InvalidData(format!("missing field '{name}'")))
}

fn parse_millis(hash: &HashMap<String, String>, name: &str) -> Result<Timestamp> {
    let raw = field(hash, name)?;
    let millis: i64 = raw
        .parse()
        .map_err(|e| StorageError::InvalidData(format!("invalid {name} '{raw}': {e}")))?;
    Timestamp::from_millisecond(millis)
        .map_err(|e| StorageError::InvalidData(format!("invalid {name} timestamp '{raw}': {e}")))
}

fn decode_hash(code: &ShortCode, hash: &HashMap<String, String>) -> Result<AliasRecord> {
    let raw_usage = field(hash, "usage_count")?;
    let usage_count = raw_usage.parse().map_err(|e| {
        StorageError::InvalidData(format!("invalid usage_count '{raw_usage}': {e}"))
    })?;

    Ok(AliasRecord {
        code: code.clone(),
        target: field(hash, "target")?.to_string(),
        created_at: parse_millis(hash, "created_at")?,
        expires_at: parse_millis(hash, "expires_at")?,
        usage_count,
    })
}

impl RedisRepository {
    /// Creates a new Redis repository.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis repository with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for record keys (e.g., "myapp:alias:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            save_script: redis::Script::new(SAVE_SCRIPT),
            increment_script: redis::Script::new(INCREMENT_SCRIPT),
        }
    }

    /// Opens a multiplexed connection to `redis_url` and wraps it.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("failed to open Redis client", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    fn key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl Repository for RedisRepository {
    async fn save(&self, code: &ShortCode, alias: NewAlias) -> Result<()> {
        let key = self.key(code);
        trace!(code = %code, "Saving alias to Redis");

        let mut conn = self.conn.clone();
        let inserted: i64 = self
            .save_script
            .key(&key)
            .arg(alias.target)
            .arg(alias.created_at.as_millisecond())
            .arg(alias.expires_at.as_millisecond())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to save alias to Redis", e))?;

        if inserted == 0 {
            debug!(code = %code, "Alias already present in Redis");
            return Err(StorageError::Conflict(code.to_string()));
        }
        Ok(())
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<AliasRecord>> {
        let key = self.key(code);
        trace!(code = %code, "Fetching alias from Redis");

        let mut conn = self.conn.clone();
        let hash = conn
            .hgetall::<_, HashMap<String, String>>(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch alias from Redis", e))?;

        if hash.is_empty() {
            return Ok(None);
        }

        decode_hash(code, &hash).map(Some).inspect_err(|e| {
            warn!(code = %code, error = %e, "Failed to decode alias hash");
        })
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let key = self.key(code);
        let mut conn = self.conn.clone();
        let removed = conn
            .del::<_, u64>(&key)
            .await
            .map_err(|e| map_redis_error("failed to delete alias from Redis", e))?;
        Ok(removed > 0)
    }

    async fn increment_usage(&self, code: &ShortCode) -> Result<bool> {
        let key = self.key(code);
        let mut conn = self.conn.clone();
        let count: i64 = self
            .increment_script
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to increment usage in Redis", e))?;
        Ok(count >= 0)
    }

    async fn purge_expired(&self, _cutoff: Timestamp) -> Result<u64> {
        // keys carry PEXPIREAT deadlines, Redis evicts them itself
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_complete_hash() {
        let code = ShortCode::new_unchecked("abc123");
        let record = decode_hash(
            &code,
            &hash(&[
                ("target", "https://example.com"),
                ("created_at", "1700000000000"),
                ("expires_at", "1700003600000"),
                ("usage_count", "7"),
            ]),
        )
        .unwrap();

        assert_eq!(record.code, code);
        assert_eq!(record.target, "https://example.com");
        assert_eq!(record.created_at.as_millisecond(), 1_700_000_000_000);
        assert_eq!(record.expires_at.as_millisecond(), 1_700_003_600_000);
        assert_eq!(record.usage_count, 7);
    }

    #[test]
    fn rejects_missing_field() {
        let code = ShortCode::new_unchecked("abc123");
        let err = decode_hash(
            &code,
            &hash(&[
                ("target", "https://example.com"),
                ("created_at", "1700000000000"),
                ("usage_count", "0"),
            ]),
        )
        .unwrap_err();

        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn rejects_malformed_counter() {
        let code = ShortCode::new_unchecked("abc123");
        let err = decode_hash(
            &code,
            &hash(&[
                ("target", "https://example.com"),
                ("created_at", "1700000000000"),
                ("expires_at", "1700003600000"),
                ("usage_count", "-1"),
            ]),
        )
        .unwrap_err();

        assert!(matches!(err, StorageError::InvalidData(_)));
    }
}
