//! Merge configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::fetcher::FetchPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Product identifier written into `PRODID`.
    pub product_id: String,
    /// Timeout for a single fetch attempt.
    pub fetch_timeout_ms: u64,
    /// Maximum number of feeds fetched at once.
    pub max_in_flight: usize,
    /// Extra attempts per feed after the first failure.
    pub fetch_retries: u32,
    pub retry_backoff_ms: u64,
    /// Feeds with a larger body are treated as unavailable.
    pub max_body_bytes: usize,
    /// Summary for manual blocks without a note.
    pub block_summary: String,
    /// Booking summaries read `<prefix> <guest name>`.
    pub booking_summary_prefix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            product_id: "haven-calendar".to_string(),
            fetch_timeout_ms: 10_000,
            max_in_flight: 4,
            fetch_retries: 0,
            retry_backoff_ms: 500,
            max_body_bytes: 5 * 1024 * 1024,
            block_summary: "Blocked".to_string(),
            booking_summary_prefix: "Reservation".to_string(),
        }
    }
}

impl MergeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: MergeConfig =
            toml::from_str(raw).map_err(|e| MergeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MergeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(MergeError::Config("product_id is empty".to_string()));
        }
        if self.product_id.contains(['\r', '\n']) {
            return Err(MergeError::Config(
                "product_id must be a single line".to_string(),
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(MergeError::Config("fetch_timeout_ms must be > 0".to_string()));
        }
        if self.max_in_flight == 0 {
            return Err(MergeError::Config("max_in_flight must be > 0".to_string()));
        }
        if self.max_body_bytes == 0 {
            return Err(MergeError::Config("max_body_bytes must be > 0".to_string()));
        }
        if self.block_summary.trim().is_empty() {
            return Err(MergeError::Config("block_summary is empty".to_string()));
        }
        Ok(())
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(self.fetch_timeout_ms),
            max_in_flight: self.max_in_flight,
            retries: self.fetch_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
