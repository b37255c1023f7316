use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use feed_merge::{CalendarMerger, HttpFetcher, JsonFileRegistry, MergeConfig};

#[derive(Debug, Parser)]
#[command(
    name = "feedmerge",
    version,
    about = "Merge external availability feeds, manual blocks and bookings into one calendar"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the merged calendar over HTTP
    Serve {
        /// Registry snapshot (JSON) with sources, blocks and bookings
        #[arg(long, env = "FEEDMERGE_REGISTRY")]
        registry: PathBuf,
        /// Merge configuration (TOML)
        #[arg(long, env = "FEEDMERGE_CONFIG")]
        config: Option<PathBuf>,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "3005")]
        port: u16,
    },
    /// Merge once and write the calendar
    Merge {
        /// Registry snapshot (JSON) with sources, blocks and bookings
        #[arg(long, env = "FEEDMERGE_REGISTRY")]
        registry: PathBuf,
        /// Merge configuration (TOML)
        #[arg(long, env = "FEEDMERGE_CONFIG")]
        config: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the event spans found in a calendar document
    Extract {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Tag every span with this platform name
        #[arg(long)]
        platform: Option<String>,
    },
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone, Args)]
pub struct ConfigOverrides {
    /// Override `product_id`
    #[arg(long, global = true)]
    pub product_id: Option<String>,
    /// Override `fetch_timeout_ms`
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
    /// Override `max_in_flight`
    #[arg(long, global = true)]
    pub max_in_flight: Option<usize>,
    /// Override `fetch_retries`
    #[arg(long, global = true)]
    pub retries: Option<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: MergeConfig) -> Result<MergeConfig> {
        if let Some(product_id) = &self.product_id {
            config.product_id = product_id.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.fetch_timeout_ms = timeout_ms;
        }
        if let Some(max_in_flight) = self.max_in_flight {
            config.max_in_flight = max_in_flight;
        }
        if let Some(retries) = self.retries {
            config.fetch_retries = retries;
        }
        config.validate().context("Invalid command-line override")?;
        Ok(config)
    }
}

/// Load the TOML config at `path`, or the defaults, then apply `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<MergeConfig> {
    let config = match path {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MergeConfig::default(),
    };
    overrides.apply(config)
}

/// Build a merger over a JSON registry snapshot and live HTTP feeds.
pub fn build_merger(registry: &Path, config: MergeConfig) -> Result<CalendarMerger> {
    let fetcher = HttpFetcher::from_config(&config).context("Failed to build HTTP client")?;
    let merger = CalendarMerger::new(
        Arc::new(JsonFileRegistry::new(registry)),
        Arc::new(fetcher),
        config,
    )?;
    Ok(merger)
}

pub fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

pub fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
