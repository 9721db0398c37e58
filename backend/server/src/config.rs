use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Error, anyhow};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// S3-compatible endpoint, `None` for AWS S3 itself.
    pub object_store_endpoint: Option<String>,
    pub bucket: String,
    pub key: String,
    pub fetch_timeout: Duration,
    pub cache: CachePolicy,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            object_store_endpoint: load_optional("OBJECT_STORE_ENDPOINT"),
            bucket: try_load("DATASET_BUCKET", "chakus3bucket")?,
            key: try_load("DATASET_KEY", "MVP/MVP_Dataframe.csv")?,
            fetch_timeout: Duration::from_secs(try_load("FETCH_TIMEOUT_SECS", "15")?),
            cache: try_load("DATASET_CACHE", "none")?,
        })
    }
}

/// How loaded datasets are reused across requests.
///
/// Only [`CachePolicy::Disabled`] exists: every request fetches and parses the
/// object again, so a changed upload is served on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Disabled,
}

impl FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::Disabled),
            other => Err(format!("unsupported cache policy {other}, expected none")),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {key} value {value}: {e}")
    })
}

fn load_optional(key: &str) -> Option<String> {
    let value = var(key).filter(|v| !v.trim().is_empty());

    if value.is_none() {
        info!("{key} not set");
    }

    value
}
