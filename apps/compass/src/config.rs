use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where persisted client state lives.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageTarget {
    Memory,
    Directory(String),
    Redis(String),
}

impl StorageTarget {
    /// Parses `memory`, `file:<dir>` or a `redis://` / `rediss://` URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("memory") {
            return Ok(StorageTarget::Memory);
        }
        if let Some(dir) = raw.strip_prefix("file:") {
            if dir.is_empty() {
                bail!("COMPASS_STORAGE 'file:' target needs a directory");
            }
            return Ok(StorageTarget::Directory(dir.to_string()));
        }
        if raw.starts_with("redis://") || raw.starts_with("rediss://") {
            return Ok(StorageTarget::Redis(raw.to_string()));
        }
        bail!("Unsupported COMPASS_STORAGE value '{raw}'")
    }
}

/// Client configuration loaded from environment variables.
/// Only the recommendation API URL is required.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub upload_url: String,
    pub analytics_url: Option<String>,
    pub storage: StorageTarget,
    pub resume_analysis_timeout: Duration,
    pub analytics_flush_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_url = require_env("COMPASS_API_URL")?
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            upload_url: std::env::var("COMPASS_UPLOAD_URL")
                .unwrap_or_else(|_| format!("{api_url}/upload")),
            analytics_url: std::env::var("COMPASS_ANALYTICS_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            storage: StorageTarget::parse(
                &std::env::var("COMPASS_STORAGE").unwrap_or_else(|_| "file:.compass".to_string()),
            )?,
            resume_analysis_timeout: Duration::from_secs(secs_env(
                "RESUME_ANALYSIS_TIMEOUT_SECS",
                120,
            )?),
            analytics_flush_interval: Duration::from_secs(secs_env("ANALYTICS_FLUSH_SECS", 10)?),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            api_url,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn secs_env(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}
