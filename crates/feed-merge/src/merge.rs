//! The end-to-end merge pipeline.
//!
//! External feeds flow fetch → extract → tag; manual blocks and bookings flow
//! through the synthesizer. Both paths join in the serializer. The external
//! fetches and the two storage reads run concurrently; assembly starts only
//! once all of them have resolved.
//!
//! Failure policy: a feed that cannot be fetched, or a span that cannot be
//! matched, is logged, recorded in the [`MergeReport`] and left out of the
//! document. A storage failure aborts the merge, because silently omitting
//! internal availability would misrepresent the property.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::MergeConfig;
use crate::error::Result;
use crate::extractor::extract_events;
use crate::fetcher::{fetch_all, FeedFetcher, FetchOutcome};
use crate::model::{Booking, EventRecord, ManualBlock};
use crate::registry::Registry;
use crate::serializer::serialize_calendar;
use crate::synth::{block_event, booking_event};
use crate::tagger::tag_event;

/// Per-source accounting for one merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub platform: String,
    /// Events contributed to the document.
    pub events: usize,
    /// Spans dropped as malformed.
    pub anomalies: usize,
    /// Set when the source was unavailable and contributed nothing.
    pub error: Option<String>,
}

/// What went into a merged document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// One entry per configured source, in registry order.
    pub sources: Vec<SourceReport>,
    pub block_events: usize,
    pub booking_events: usize,
}

impl MergeReport {
    pub fn external_events(&self) -> usize {
        self.sources.iter().map(|s| s.events).sum()
    }

    pub fn total_events(&self) -> usize {
        self.external_events() + self.block_events + self.booking_events
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }

    pub fn anomalies(&self) -> usize {
        self.sources.iter().map(|s| s.anomalies).sum()
    }
}

/// A complete merged document and its report.
#[derive(Debug, Clone)]
pub struct MergedCalendar {
    pub document: String,
    pub report: MergeReport,
}

/// Merges the registry's sources, blocks and bookings into one calendar.
///
/// Holds no state between merges; every call reads the registry afresh.
#[derive(Clone)]
pub struct CalendarMerger {
    registry: Arc<dyn Registry>,
    fetcher: Arc<dyn FeedFetcher>,
    config: MergeConfig,
}

impl CalendarMerger {
    pub fn new(
        registry: Arc<dyn Registry>,
        fetcher: Arc<dyn FeedFetcher>,
        config: MergeConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            fetcher,
            config,
        })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Run one merge.
    ///
    /// # Errors
    /// Returns `MergeError::Storage` if the source list, the blocks or the
    /// bookings cannot be read. Feed failures never surface here.
    #[instrument(level = "info", skip_all, fields(product_id = %self.config.product_id))]
    pub async fn merge(&self) -> Result<MergedCalendar> {
        let sources = self.registry.feed_sources().await?;
        let policy = self.config.fetch_policy();

        let (outcomes, blocks, bookings) = tokio::join!(
            fetch_all(self.fetcher.as_ref(), &sources, &policy),
            self.registry.manual_blocks(),
            self.registry.bookings(),
        );
        let blocks = blocks?;
        let bookings = bookings?;

        let merged = self.assemble(outcomes, &blocks, &bookings);
        let failed = merged.report.failed_sources().count();
        info!(
            sources = merged.report.sources.len(),
            failed_sources = failed,
            external_events = merged.report.external_events(),
            block_events = merged.report.block_events,
            booking_events = merged.report.booking_events,
            anomalies = merged.report.anomalies(),
            "merged calendar"
        );
        Ok(merged)
    }

    fn assemble(
        &self,
        outcomes: Vec<FetchOutcome>,
        blocks: &[ManualBlock],
        bookings: &[Booking],
    ) -> MergedCalendar {
        let mut report = MergeReport::default();
        let mut external: Vec<String> = Vec::new();

        for outcome in outcomes {
            let platform = outcome.source.platform;
            match outcome.result {
                Ok(doc) => {
                    let before = external.len();
                    let mut spans = extract_events(&doc.body);
                    for span in spans.by_ref() {
                        external.push(tag_event(span, &platform));
                    }
                    report.sources.push(SourceReport {
                        events: external.len() - before,
                        anomalies: spans.anomalies().len(),
                        error: None,
                        platform,
                    });
                }
                Err(err) => {
                    warn!(platform = %platform, error = %err, "skipping unavailable feed");
                    report.sources.push(SourceReport {
                        platform,
                        events: 0,
                        anomalies: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let block_events: Vec<EventRecord> = blocks
            .iter()
            .map(|b| block_event(b, &self.config.block_summary))
            .collect();
        let booking_events: Vec<EventRecord> = bookings
            .iter()
            .map(|b| booking_event(b, &self.config.booking_summary_prefix))
            .collect();
        report.block_events = block_events.len();
        report.booking_events = booking_events.len();

        let document = serialize_calendar(
            &self.config.product_id,
            &external,
            &block_events,
            &booking_events,
        );
        MergedCalendar { document, report }
    }
}
