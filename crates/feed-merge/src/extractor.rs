//! Lenient `VEVENT` span extraction.
//!
//! The extractor never parses event fields and never requires a well-formed
//! `VCALENDAR` envelope. It scans for `BEGIN:VEVENT` … `END:VEVENT` spans and
//! yields each one verbatim; everything outside a span is ignored.
//!
//! # Anomalies
//!
//! - A begin marker followed by another begin marker before any end marker is an
//!   orphan. The text from the orphan up to the next begin marker is dropped and
//!   recorded; the innermost well-formed span is still yielded.
//! - A begin marker with no end marker after it (truncated document) is dropped
//!   and recorded.
//!
//! Anomalies never fail the scan; they only reduce the number of spans.

use once_cell::sync::Lazy;
use regex::{Matches, Regex};
use tracing::debug;

use crate::error::MergeError;

pub const EVENT_BEGIN: &str = "BEGIN:VEVENT";
pub const EVENT_END: &str = "END:VEVENT";

/// Compiled once for the whole process; matching is case-sensitive and non-overlapping.
static EVENT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)BEGIN:VEVENT.*?END:VEVENT").expect("valid event span regex"));

/// Scan `raw` for event spans.
///
/// The returned iterator is lazy: the document is scanned as spans are pulled.
pub fn extract_events(raw: &str) -> EventSpans<'_> {
    let pattern: &'static Regex = &EVENT_SPAN;
    EventSpans {
        raw,
        matches: pattern.find_iter(raw),
        cursor: 0,
        anomalies: Vec::new(),
        exhausted: false,
    }
}

/// Iterator over the `VEVENT` spans of one document.
pub struct EventSpans<'a> {
    raw: &'a str,
    matches: Matches<'static, 'a>,
    cursor: usize,
    anomalies: Vec<MergeError>,
    exhausted: bool,
}

impl<'a> EventSpans<'a> {
    /// Anomalies seen so far. Complete only once the iterator is exhausted.
    pub fn anomalies(&self) -> &[MergeError] {
        &self.anomalies
    }

    fn record(&mut self, offset: usize, message: &str) {
        debug!(offset, message, "dropping malformed event span");
        self.anomalies.push(MergeError::ParseAnomaly {
            offset,
            message: message.to_string(),
        });
    }

    fn check_tail(&mut self) {
        let tail = &self.raw[self.cursor..];
        let offsets: Vec<usize> = tail
            .match_indices(EVENT_BEGIN)
            .map(|(i, _)| self.cursor + i)
            .collect();
        for offset in offsets {
            self.record(offset, "unterminated event span");
        }
    }
}

impl<'a> Iterator for EventSpans<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let Some(m) = self.matches.next() else {
            if !self.exhausted {
                self.exhausted = true;
                self.check_tail();
            }
            return None;
        };
        self.cursor = m.end();

        let span = m.as_str();
        // The match always starts with the begin marker, so rfind finds at least that one.
        let innermost = span.rfind(EVENT_BEGIN).unwrap_or(0);
        if innermost > 0 {
            let orphans: Vec<usize> = span[..innermost]
                .match_indices(EVENT_BEGIN)
                .map(|(i, _)| m.start() + i)
                .collect();
            for offset in orphans {
                self.record(offset, "begin marker without matching end marker");
            }
        }

        Some(span[innermost..].trim_end())
    }
}

impl std::iter::FusedIterator for EventSpans<'_> {}
