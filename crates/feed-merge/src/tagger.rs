//! Provenance tagging for externally sourced events.

use crate::extractor::EVENT_BEGIN;
use crate::format::{escape_text, CRLF};

/// Insert a `CATEGORIES:<platform>` line directly after the block's begin marker.
///
/// Exactly one line is inserted, even if the block already carries a
/// `CATEGORIES` property; clients honour the earliest one, so the platform tag
/// always wins. The inserted line reuses the block's own line ending (`\r\n` or
/// `\n`), defaulting to `\r\n`. Nothing else in the block is changed.
///
/// A block without a begin marker is returned unchanged.
pub fn tag_event(block: &str, platform: &str) -> String {
    let Some(pos) = block.find(EVENT_BEGIN) else {
        return block.to_string();
    };
    let split = pos + EVENT_BEGIN.len();
    let (head, rest) = block.split_at(split);

    let eol = if rest.starts_with(CRLF) {
        CRLF
    } else if rest.starts_with('\n') {
        "\n"
    } else {
        CRLF
    };

    let label = escape_text(platform);
    let mut out = String::with_capacity(block.len() + label.len() + 14);
    out.push_str(head);
    out.push_str(eol);
    out.push_str("CATEGORIES:");
    out.push_str(&label);
    out.push_str(rest);
    out
}
