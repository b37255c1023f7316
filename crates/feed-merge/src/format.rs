//! Value formatting for iCalendar content lines.

use chrono::{DateTime, Utc};

/// Content-line terminator used for everything this crate writes.
pub const CRLF: &str = "\r\n";

/// Render a timestamp in calendar-basic UTC form: `YYYYMMDDTHHMMSSZ`.
pub fn format_utc(ts: &DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value (RFC 5545 §3.3.11).
///
/// Backslash, semicolon and comma are backslash-escaped; any line break becomes
/// the two-character sequence `\n` so a value can never split a content line.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn utc_basic_form() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 9, 5, 7).unwrap();
        assert_eq!(format_utc(&ts), "20240601T090507Z");
    }

    #[test]
    fn escapes_structural_characters() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("line1\r\nline2\nline3"), "line1\\nline2\\nline3");
        assert_eq!(escape_text("Jane Doe"), "Jane Doe");
    }
}
