use crate::error::ShortenerError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub target: String,
    /// Lifetime in seconds. Zero or negative selects the service default.
    pub ttl_seconds: i64,
}

impl ShortenParams {
    pub fn new(target: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            target: target.into(),
            ttl_seconds,
        }
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates an alias for the target and returns its short code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Resolves a short code to its target and counts the visit.
    /// Fails with `NotFound` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns how many times a code has been resolved.
    /// Fails with `NotFound` if the code does not exist or has expired.
    async fn usage(&self, code: &ShortCode) -> Result<u64>;

    /// Removes expired records from the store and returns how many were removed.
    async fn purge_expired(&self) -> Result<u64>;
}
