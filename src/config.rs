use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb: TmdbConfig,
}

#[derive(Clone, Debug)]
pub struct TmdbConfig {
    pub base_url: String,
    pub access_token: String,
    pub rps: u32,
    pub fetch: FetchConfig,
}

/// Retry and timeout settings for outbound catalog requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay slept after the failed attempt with the given 0-based index.
    pub fn backoff_for(&self, attempt_index: u32) -> Duration {
        let factor = u64::from(self.backoff_multiplier).saturating_pow(attempt_index);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://marquee.db?mode=rwc".to_string());

        let defaults = FetchConfig::default();
        let fetch = FetchConfig {
            timeout_ms: parse_or(&lookup, "TMDB_TIMEOUT_MS", defaults.timeout_ms)?,
            max_attempts: parse_or(&lookup, "TMDB_MAX_ATTEMPTS", defaults.max_attempts)?,
            initial_backoff_ms: parse_or(
                &lookup,
                "TMDB_INITIAL_BACKOFF_MS",
                defaults.initial_backoff_ms,
            )?,
            backoff_multiplier: parse_or(
                &lookup,
                "TMDB_BACKOFF_MULTIPLIER",
                defaults.backoff_multiplier,
            )?,
        };
        if fetch.max_attempts == 0 {
            anyhow::bail!("TMDB_MAX_ATTEMPTS must be at least 1");
        }

        let tmdb = TmdbConfig {
            base_url: lookup("TMDB_BASE_URL")
                .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string()),
            access_token: lookup("TMDB_ACCESS_TOKEN").unwrap_or_default(),
            rps: parse_or(&lookup, "TMDB_RPS", 40)?,
            fetch,
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{key}={raw}")),
        None => Ok(default),
    }
}
