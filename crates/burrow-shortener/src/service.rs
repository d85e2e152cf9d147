use crate::settings::ShortenerSettings;
use async_trait::async_trait;
use burrow_core::repository::{AliasRecord, NewAlias, Repository};
use burrow_core::{
    Clock, ShortCode, ShortenParams, Shortener, ShortenerError, StorageError, SystemClock,
};
use burrow_generator::Generator;
use jiff::{SignedDuration, Timestamp};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use url::Url;

type Result<T> = std::result::Result<T, ShortenerError>;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation and TTL defaulting
/// - Unique code selection (probe, then insert; a conflicting insert is retried)
/// - Expiry enforcement on every read
/// - Usage accounting on successful resolution
///
/// Every store call is bounded by [`ShortenerSettings::store_timeout`].
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: ShortenerSettings,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a service with default settings and the system clock.
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            settings: ShortenerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ShortenerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Accepts only absolute `http`/`https` URLs with a host.
    ///
    /// The target is stored as given and later sent back in a `Location`
    /// header, so control characters and surrounding whitespace that the
    /// URL parser would silently strip are rejected up front.
    fn validate_url(target: &str) -> Result<()> {
        if target.chars().any(|c| c.is_ascii_control()) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL contains control characters: {:?}",
                target
            )));
        }
        if target.trim() != target {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL has leading or trailing whitespace: {:?}",
                target
            )));
        }

        let parsed = Url::parse(target)
            .map_err(|e| ShortenerError::InvalidUrl(format!("'{}': {}", target, e)))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {}",
                target
            ))),
        }
    }

    fn ttl_for(&self, ttl_seconds: i64) -> Result<SignedDuration> {
        if ttl_seconds > 0 {
            return Ok(SignedDuration::from_secs(ttl_seconds));
        }
        SignedDuration::try_from(self.settings.default_ttl)
            .map_err(|e| ShortenerError::InvalidTtl(format!("default ttl out of range: {}", e)))
    }

    /// Runs one store call under the configured timeout.
    async fn within<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = std::result::Result<T, StorageError>>,
    ) -> std::result::Result<T, StorageError> {
        match tokio::time::timeout(self.settings.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "{} did not finish within {:?}",
                operation, self.settings.store_timeout
            ))),
        }
    }

    /// Best-effort removal of a record observed past its deadline.
    async fn discard_expired(&self, code: &ShortCode) {
        match self.within("delete", self.repository.delete(code)).await {
            Ok(_) => debug!(code = %code, "Removed expired alias"),
            Err(e) => warn!(code = %code, error = %e, "Failed to remove expired alias"),
        }
    }

    /// Fetches a record and treats expired records as absent.
    async fn fetch_live(&self, code: &ShortCode) -> Result<AliasRecord> {
        let Some(record) = self.within("get", self.repository.get(code)).await? else {
            trace!(code = %code, "Short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        if record.is_expired_at(self.clock.now()) {
            debug!(code = %code, expires_at = %record.expires_at, "Record has expired");
            self.discard_expired(code).await;
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        Ok(record)
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode> {
        Self::validate_url(&params.target)?;

        let ttl = self.ttl_for(params.ttl_seconds)?;
        let created_at = self.clock.now();
        let expires_at: Timestamp = created_at
            .checked_add(ttl)
            .map_err(|e| ShortenerError::InvalidTtl(format!("{}s: {}", params.ttl_seconds, e)))?;

        let max_attempts = self.settings.max_attempts;
        for attempt in 1..=max_attempts {
            let code: ShortCode = self.generator.generate().into();

            if self.within("get", self.repository.get(&code)).await?.is_some() {
                debug!(code = %code, attempt, "Generated code is taken");
                continue;
            }

            let alias = NewAlias {
                target: params.target.clone(),
                created_at,
                expires_at,
            };

            match self.within("save", self.repository.save(&code, alias)).await {
                Ok(()) => {
                    info!(code = %code, expires_at = %expires_at, attempt, "Created alias");
                    return Ok(code);
                }
                Err(StorageError::Conflict(_)) => {
                    debug!(code = %code, attempt, "Code claimed concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = max_attempts, "Gave up looking for a free short code");
        Err(ShortenerError::Exhausted {
            attempts: max_attempts,
        })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "resolving short code");
        let record = self.fetch_live(code).await?;

        match self
            .within("increment_usage", self.repository.increment_usage(code))
            .await
        {
            Ok(true) => {}
            // deleted between the read and the increment
            Ok(false) => return Err(ShortenerError::NotFound(code.to_string())),
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to record usage, redirecting anyway");
            }
        }

        debug!(code = %code, target = %record.target, "Resolved short code");
        Ok(record.target)
    }

    async fn usage(&self, code: &ShortCode) -> Result<u64> {
        let record = self.fetch_live(code).await?;
        Ok(record.usage_count)
    }

    async fn purge_expired(&self) -> Result<u64> {
        let cutoff = self.clock.now();
        let removed = self
            .within("purge_expired", self.repository.purge_expired(cutoff))
            .await?;
        Ok(removed)
    }
}
