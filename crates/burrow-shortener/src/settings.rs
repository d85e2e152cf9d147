use std::time::Duration;
use typed_builder::TypedBuilder;

/// Tunables for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Lifetime applied when a caller asks for a zero or negative TTL.
    #[builder(default = Duration::from_secs(3600))]
    pub default_ttl: Duration,

    /// Codes tried before `shorten` gives up with `Exhausted`.
    #[builder(default = 16)]
    pub max_attempts: u32,

    /// Upper bound for each individual store call.
    #[builder(default = Duration::from_secs(5))]
    pub store_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ShortenerSettings::default();
        assert_eq!(settings.default_ttl, Duration::from_secs(3600));
        assert_eq!(settings.max_attempts, 16);
        assert_eq!(settings.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn overrides() {
        let settings = ShortenerSettings::builder()
            .default_ttl(Duration::from_secs(60))
            .max_attempts(3)
            .store_timeout(Duration::from_millis(250))
            .build();
        assert_eq!(settings.default_ttl, Duration::from_secs(60));
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.store_timeout, Duration::from_millis(250));
    }
}
