//! Data model shared by every merge stage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::format::{escape_text, format_utc, CRLF};

/// Category carried by events synthesized from manual blocks.
pub const BLOCK_CATEGORY: &str = "Block";
/// Category carried by events synthesized from the site's own bookings.
pub const SITE_CATEGORY: &str = "Site";

/// An externally hosted calendar feed belonging to one booking platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    /// Platform label, e.g. "Airbnb". Becomes the events' `CATEGORIES` value.
    pub platform: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
        }
    }
}

/// The unparsed body of one fetched feed.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source: FeedSource,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Confirmed,
    Tentative,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthesized calendar event.
///
/// Invariant: `start <= end`. `category` is a platform name or one of
/// [`BLOCK_CATEGORY`] / [`SITE_CATEGORY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: EventStatus,
    pub category: String,
}

impl EventRecord {
    /// Render as a `VEVENT` block, without a trailing line break.
    pub fn to_vevent(&self) -> String {
        let mut out = String::with_capacity(160 + self.summary.len());
        self.write_vevent(&mut out);
        out
    }

    /// Append the `VEVENT` block to `out`, without a trailing line break.
    pub fn write_vevent(&self, out: &mut String) {
        let lines = [
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", escape_text(&self.uid)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("CATEGORIES:{}", escape_text(&self.category)),
            format!("DTSTART:{}", format_utc(&self.start)),
            format!("DTEND:{}", format_utc(&self.end)),
            format!("STATUS:{}", self.status),
            "END:VEVENT".to_string(),
        ];
        out.push_str(&lines.join(CRLF));
    }
}

/// Owner-imposed unavailability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualBlock {
    pub id: i64,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Lifecycle status of a booking.
///
/// Any stored value other than the three known ones, a `null` and a missing
/// status all read as [`BookingStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Requested,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

fn nullable_status<'de, D>(deserializer: D) -> Result<BookingStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BookingStatus>::deserialize(deserializer)?.unwrap_or(BookingStatus::Other))
}

fn missing_status() -> BookingStatus {
    BookingStatus::Other
}

/// A reservation recorded by the site itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub guest_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(default = "missing_status", deserialize_with = "nullable_status")]
    pub status: BookingStatus,
    /// Used only for the storage collaborator's default ordering.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
