use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::index::RetentionFilter;
use crate::listing::TransferLimits;

pub const DEFAULT_LISTING_URL: &str =
    "https://repo.jenkins-ci.org/api/storage/releases/?list&deep=1";

/// Configuration loaded from `~/.config/repo-checksums/config.toml`.
///
/// Credentials are never read from here; see [`crate::Credentials::from_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Storage API URL returning a deep listing of the release tree.
    pub listing_url: String,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Upper bound on the whole listing request in seconds.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s...
    #[serde(default = "default_low_speed_limit")]
    pub low_speed_limit_bytes: u32,
    /// ...for this many seconds.
    #[serde(default = "default_low_speed_time")]
    pub low_speed_time_secs: u64,
    /// Path suffixes kept in the index; everything else is dropped at ingestion.
    #[serde(default = "default_extensions")]
    pub retained_extensions: Vec<String>,
}

fn default_low_speed_limit() -> u32 {
    1024
}

fn default_low_speed_time() -> u64 {
    60
}

fn default_extensions() -> Vec<String> {
    RetentionFilter::default().suffixes().to_vec()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            connect_timeout_secs: 15,
            timeout_secs: 600,
            low_speed_limit_bytes: default_low_speed_limit(),
            low_speed_time_secs: default_low_speed_time(),
            retained_extensions: default_extensions(),
        }
    }
}

impl IndexConfig {
    pub fn transfer_limits(&self) -> TransferLimits {
        TransferLimits {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }

    pub fn retention_filter(&self) -> RetentionFilter {
        RetentionFilter::new(self.retained_extensions.iter().cloned())
    }

    /// Reject settings that would make the fetch unbounded or the index useless.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.listing_url)
            .with_context(|| format!("invalid listing_url: {}", self.listing_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("listing_url must be http or https: {}", self.listing_url);
        }
        if parsed.host_str().is_none() {
            anyhow::bail!("listing_url missing host: {}", self.listing_url);
        }
        if self.connect_timeout_secs == 0 || self.timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs and timeout_secs must be greater than zero");
        }
        if self.retained_extensions.iter().all(|e| e.is_empty()) {
            anyhow::bail!("retained_extensions must name at least one suffix");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("repo-checksums")?;
    Ok(xdg_dirs.get_config_home().join("config.toml"))
}

/// Load and validate configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<IndexConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: IndexConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load configuration from disk, or built-in defaults if no file exists.
/// Never writes anything.
pub fn load_or_default() -> Result<IndexConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(IndexConfig::default());
    }
    load_from(&path)
}
