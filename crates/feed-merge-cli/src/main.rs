//! `feedmerge`: build one availability calendar from many.
//!
//! ## Usage
//!
//! ```sh
//! # Serve GET /calendar/merged.ics on 0.0.0.0:3005
//! feedmerge serve --registry registry.json
//!
//! # Merge once to stdout, with a config file and an override
//! feedmerge merge --registry registry.json --config merge.toml --timeout-ms 3000
//!
//! # Merge once to a file
//! feedmerge merge --registry registry.json -o merged.ics
//!
//! # Show the event spans of a downloaded feed, tagged with its platform
//! feedmerge extract -i airbnb.ics --platform Airbnb
//! ```

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use feed_merge::{extract_events, tag_event};
use feed_merge_cli::cli::{self, Cli, Commands};
use feed_merge_cli::{server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json)?;

    match cli.command {
        Commands::Serve {
            registry,
            config,
            host,
            port,
        } => {
            let config = cli::load_config(config.as_deref(), &cli.overrides)?;
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid listen address: {host}:{port}"))?;
            let merger = cli::build_merger(&registry, config)?;
            server::serve(addr, merger).await?;
        }
        Commands::Merge {
            registry,
            config,
            output,
        } => {
            let config = cli::load_config(config.as_deref(), &cli.overrides)?;
            let merger = cli::build_merger(&registry, config)?;
            let merged = merger.merge().await.context("Merge failed")?;
            cli::write_output(output.as_deref(), &merged.document)?;
        }
        Commands::Extract { input, platform } => {
            let raw = cli::read_input(input.as_deref())?;
            let mut spans = extract_events(&raw);
            let blocks: Vec<String> = spans
                .by_ref()
                .map(|span| match platform.as_deref() {
                    Some(platform) => tag_event(span, platform),
                    None => span.to_string(),
                })
                .collect();
            for anomaly in spans.anomalies() {
                tracing::warn!(%anomaly, "skipped malformed span");
            }
            tracing::info!(
                spans = blocks.len(),
                anomalies = spans.anomalies().len(),
                "extracted event spans"
            );

            let mut out = blocks.join("\n\n");
            if !out.is_empty() {
                out.push('\n');
            }
            cli::write_output(None, &out)?;
        }
    }

    Ok(())
}
