use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Backend API, e.g. `http://localhost:4000/api`
    pub base_url: String,
    /// Extra attempts for a failed statistics read (visits never retry)
    #[serde(default = "BackendConfig::default_retries")]
    pub retries: u32,
    #[serde(default = "BackendConfig::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "CacheConfig::default_max_entries")]
    pub max_entries: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bearer token of the signed-in viewer
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl BackendConfig {
    const fn default_retries() -> u32 {
        1
    }

    const fn default_retry_delay_ms() -> u64 {
        1000
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl CacheConfig {
    const fn default_ttl_secs() -> u64 {
        60
    }

    const fn default_max_entries() -> u64 {
        1000
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Self::default_ttl_secs(),
            max_entries: Self::default_max_entries(),
        }
    }
}

fn env_number<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Blank tokens count as signed out
fn non_empty_token(raw: Option<String>) -> Option<String> {
    raw.filter(|token| !token.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("BACKEND_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000".to_string());
        reqwest::Url::parse(&base_url)
            .with_context(|| format!("BACKEND_API_URL is not a valid URL: '{base_url}'"))?;

        let retries = env_number("STATS_RETRIES", BackendConfig::default_retries())?;
        let retry_delay_ms =
            env_number("STATS_RETRY_DELAY_MS", BackendConfig::default_retry_delay_ms())?;

        let ttl_secs = env_number("STATS_CACHE_TTL_SECS", CacheConfig::default_ttl_secs())?;
        let max_entries =
            env_number("STATS_CACHE_MAX_ENTRIES", CacheConfig::default_max_entries())?;

        let auth_token = non_empty_token(std::env::var("AUTH_TOKEN").ok());

        Ok(Config {
            backend: BackendConfig {
                base_url,
                retries,
                retry_delay_ms,
            },
            cache: CacheConfig {
                ttl_secs,
                max_entries,
            },
            session: SessionConfig { auth_token },
        })
    }
}
