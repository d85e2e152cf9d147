use burrow_shortener::ShortenerSettings;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "BURROW_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BURROW_MYSQL_DSN";
pub const REDIS_URL_ENV: &str = "BURROW_REDIS_URL";
pub const DEFAULT_TTL_ENV: &str = "BURROW_DEFAULT_TTL_SECS";
pub const STORE_TIMEOUT_ENV: &str = "BURROW_STORE_TIMEOUT_MS";
pub const MAX_ATTEMPTS_ENV: &str = "BURROW_MAX_ATTEMPTS";
pub const SWEEP_INTERVAL_ENV: &str = "BURROW_SWEEP_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix joined with the code to form the public short URL.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = DEFAULT_TTL_ENV,
        default_value_t = 3600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub default_ttl_secs: u64,

    #[arg(
        long,
        env = STORE_TIMEOUT_ENV,
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub store_timeout_ms: u64,

    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = 16,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Seconds between purges of expired aliases; 0 disables the sweeper.
    #[arg(long, env = SWEEP_INTERVAL_ENV, default_value_t = 60)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn settings(&self) -> ShortenerSettings {
        ShortenerSettings::builder()
            .default_ttl(Duration::from_secs(self.default_ttl_secs))
            .store_timeout(Duration::from_millis(self.store_timeout_ms))
            .max_attempts(self.max_attempts)
            .build()
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_memory() {
        let cli = Cli::try_parse_from(["burrow-gateway"]).unwrap();

        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.sweep_interval(), Some(Duration::from_secs(60)));

        let settings = cli.settings();
        assert_eq!(settings.default_ttl, Duration::from_secs(3600));
        assert_eq!(settings.store_timeout, Duration::from_secs(5));
        assert_eq!(settings.max_attempts, 16);
    }

    #[test]
    fn mysql_requires_dsn() {
        assert!(Cli::try_parse_from(["burrow-gateway", "--storage", "mysql"]).is_err());

        let cli = Cli::try_parse_from([
            "burrow-gateway",
            "--storage",
            "mysql",
            "--mysql-dsn",
            "mysql://root@localhost/burrow",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Mysql);
        assert_eq!(
            cli.mysql_dsn.as_deref(),
            Some("mysql://root@localhost/burrow")
        );
    }

    #[test]
    fn redis_requires_url() {
        assert!(Cli::try_parse_from(["burrow-gateway", "--storage", "redis"]).is_err());

        let cli = Cli::try_parse_from([
            "burrow-gateway",
            "--storage",
            "redis",
            "--redis-url",
            "redis://localhost:6379",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Redis);
    }

    #[test]
    fn zero_interval_disables_sweeper() {
        let cli =
            Cli::try_parse_from(["burrow-gateway", "--sweep-interval-secs", "0"]).unwrap();
        assert_eq!(cli.sweep_interval(), None);
    }

    #[test]
    fn zero_tunables_are_rejected() {
        for flag in ["--default-ttl-secs", "--store-timeout-ms", "--max-attempts"] {
            assert!(
                Cli::try_parse_from(["burrow-gateway", flag, "0"]).is_err(),
                "{flag} 0 should be rejected"
            );
        }
    }

    #[test]
    fn tunables_flow_into_settings() {
        let cli = Cli::try_parse_from([
            "burrow-gateway",
            "--default-ttl-secs",
            "60",
            "--store-timeout-ms",
            "250",
            "--max-attempts",
            "4",
            "--log-format",
            "json",
        ])
        .unwrap();

        let settings = cli.settings();
        assert_eq!(settings.default_ttl, Duration::from_secs(60));
        assert_eq!(settings.store_timeout, Duration::from_millis(250));
        assert_eq!(settings.max_attempts, 4);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
