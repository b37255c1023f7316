//! Assembly of the merged `VCALENDAR` document.
//!
//! Output is built in one append-only buffer: the envelope header is written
//! up front, each event is appended once, and the closing line is written by
//! [`CalendarWriter::finish`]. The envelope is present even with zero events.

use crate::format::CRLF;
use crate::model::EventRecord;

/// Append-only writer for one merged calendar.
#[derive(Debug)]
pub struct CalendarWriter {
    buf: String,
    events: usize,
}

impl CalendarWriter {
    /// Start a document whose `PRODID` is `-//<product_id>//Merged Calendar//EN`.
    pub fn new(product_id: &str) -> Self {
        Self::with_capacity(product_id, 0)
    }

    /// Like [`CalendarWriter::new`], reserving room for `capacity` bytes of events.
    pub fn with_capacity(product_id: &str, capacity: usize) -> Self {
        let mut buf = String::with_capacity(capacity + 96);
        buf.push_str("BEGIN:VCALENDAR");
        buf.push_str(CRLF);
        buf.push_str("VERSION:2.0");
        buf.push_str(CRLF);
        buf.push_str("PRODID:-//");
        buf.push_str(product_id);
        buf.push_str("//Merged Calendar//EN");
        buf.push_str(CRLF);
        Self { buf, events: 0 }
    }

    /// Append an already-rendered `VEVENT` block. Trailing whitespace is dropped
    /// and every line, the last included, is terminated with `\r\n`, whatever
    /// ending the block used. Blank input is ignored.
    pub fn push_block(&mut self, block: &str) {
        let block = block.trim_end();
        if block.is_empty() {
            return;
        }
        for line in block.lines() {
            self.buf.push_str(line);
            self.buf.push_str(CRLF);
        }
        self.events += 1;
    }

    pub fn push_record(&mut self, record: &EventRecord) {
        record.write_vevent(&mut self.buf);
        self.buf.push_str(CRLF);
        self.events += 1;
    }

    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Close the envelope and return the document.
    pub fn finish(mut self) -> String {
        self.buf.push_str("END:VCALENDAR");
        self.buf.push_str(CRLF);
        self.buf
    }
}

/// Serialize the three event groups in their fixed order: external blocks,
/// then block-derived events, then booking-derived events.
///
/// No deduplication is performed.
pub fn serialize_calendar<S: AsRef<str>>(
    product_id: &str,
    external: &[S],
    blocks: &[EventRecord],
    bookings: &[EventRecord],
) -> String {
    let external_len: usize = external.iter().map(|b| b.as_ref().len() + 2).sum();
    let internal_len = (blocks.len() + bookings.len()) * 192;
    let mut writer = CalendarWriter::with_capacity(product_id, external_len + internal_len);

    for block in external {
        writer.push_block(block.as_ref());
    }
    for record in blocks.iter().chain(bookings) {
        writer.push_record(record);
    }
    writer.finish()
}
