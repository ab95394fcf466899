use anyhow::{Context, Result};
use tokio::time::Duration;

use std::path::PathBuf;

use finder_core::EnabledCategories;

pub const DEFAULT_LOCATIONS_CACHE_TTL_MS: u64 = 300_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Base URL of the location-data backend.
    pub upstream_api_url: String,
    /// Built front-end; `index.html` is served for category pages.
    pub static_dir: PathBuf,
    pub locations_cache_ttl: Duration,
    pub request_timeout: Duration,
    pub enabled: EnabledCategories,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{} must be set", key));
        let millis = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("{} must be a number of milliseconds, got {:?}", key, value)),
                None => Ok(Duration::from_millis(default)),
            }
        };

        Ok(Self {
            server_address: required("SERVER_ADDRESS")?,
            upstream_api_url: required("UPSTREAM_API_URL")?,
            static_dir: PathBuf::from(required("STATIC_DIR")?),
            locations_cache_ttl: millis("LOCATIONS_CACHE_TTL_MS", DEFAULT_LOCATIONS_CACHE_TTL_MS)?,
            request_timeout: millis("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
            enabled: EnabledCategories::from_lookup(&lookup),
        })
    }
}
