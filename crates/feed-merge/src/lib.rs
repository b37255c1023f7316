//! # feed-merge
//!
//! Merges the availability of one rentable property into a single iCalendar feed.
//!
//! Busy time comes from three places: externally hosted booking-platform feeds,
//! owner-entered manual blocks, and reservations recorded by the site itself.
//! External feeds are fetched concurrently and scanned leniently for `VEVENT`
//! spans; internal records are synthesized into events of the same shape. The
//! result is one envelope that calendar clients and channel managers can
//! subscribe to. A broken or unreachable feed costs only its own events.
//!
//! ## Modules
//!
//! - [`extractor`]: raw calendar text → lazy sequence of `VEVENT` spans
//! - [`tagger`]: stamp an extracted span with its platform category
//! - [`synth`]: manual blocks and bookings → [`EventRecord`]s
//! - [`serializer`]: append-only assembly of the merged document
//! - [`fetcher`]: bounded-concurrency retrieval of external feeds
//! - [`registry`]: storage collaborator interface (sources, blocks, bookings)
//! - [`merge`]: the end-to-end pipeline
//! - [`config`]: merge configuration
//! - [`model`]: data model shared by all stages
//! - [`format`]: timestamp and TEXT value formatting
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod format;
pub mod merge;
pub mod model;
pub mod registry;
pub mod serializer;
pub mod synth;
pub mod tagger;

pub use config::MergeConfig;
pub use error::MergeError;
pub use extractor::{extract_events, EventSpans};
pub use fetcher::{fetch_all, FeedFetcher, FetchPolicy, HttpFetcher};
pub use merge::{CalendarMerger, MergeReport, MergedCalendar, SourceReport};
pub use model::{
    Booking, BookingStatus, EventRecord, EventStatus, FeedSource, ManualBlock, RawDocument,
};
pub use registry::{JsonFileRegistry, MemoryRegistry, Registry, RegistrySnapshot};
pub use serializer::{serialize_calendar, CalendarWriter};
pub use tagger::tag_event;
