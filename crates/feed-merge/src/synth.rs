//! Synthesis of events for internally stored data.
//!
//! Manual blocks and bookings are turned into [`EventRecord`]s with the same
//! shape as external events, so the serializer can treat all sources alike.

use tracing::warn;

use crate::model::{
    Booking, BookingStatus, EventRecord, EventStatus, ManualBlock, BLOCK_CATEGORY, SITE_CATEGORY,
};

/// Prefix of every block-derived UID. The block's primary key follows it.
pub const BLOCK_UID_PREFIX: &str = "block-";

/// Build the event for one manual block.
///
/// The UID is derived from the block's storage id, so repeated merges of the
/// same block always produce the same UID. A non-empty note becomes the
/// summary; otherwise `default_summary` is used. Blocks are always confirmed.
pub fn block_event(block: &ManualBlock, default_summary: &str) -> EventRecord {
    let summary = match block.note.as_deref() {
        Some(note) if !note.is_empty() => note.to_string(),
        _ => default_summary.to_string(),
    };

    let (start, end) = if block.from <= block.to {
        (block.from, block.to)
    } else {
        warn!(block_id = block.id, "manual block ends before it starts; swapping bounds");
        (block.to, block.from)
    };

    EventRecord {
        uid: format!("{BLOCK_UID_PREFIX}{}", block.id),
        summary,
        start,
        end,
        status: EventStatus::Confirmed,
        category: BLOCK_CATEGORY.to_string(),
    }
}

/// Build the event for one booking.
///
/// The booking id is already unique and is used as the UID. The summary is
/// `"<prefix> <guest name>"`.
pub fn booking_event(booking: &Booking, summary_prefix: &str) -> EventRecord {
    let guest = booking.guest_name.trim();
    let summary = match (summary_prefix.trim(), guest) {
        ("", guest) => guest.to_string(),
        (prefix, "") => prefix.to_string(),
        (prefix, guest) => format!("{prefix} {guest}"),
    };

    let (start, end) = if booking.check_in <= booking.check_out {
        (booking.check_in, booking.check_out)
    } else {
        warn!(booking_id = %booking.id, "booking checks out before it checks in; swapping bounds");
        (booking.check_out, booking.check_in)
    };

    EventRecord {
        uid: booking.id.clone(),
        summary,
        start,
        end,
        status: booking_status(booking.status),
        category: SITE_CATEGORY.to_string(),
    }
}

/// Only approved bookings are confirmed.
///
/// Requested, rejected and unrecognised bookings are all published as
/// tentative placeholders.
pub fn booking_status(status: BookingStatus) -> EventStatus {
    match status {
        BookingStatus::Approved => EventStatus::Confirmed,
        BookingStatus::Requested | BookingStatus::Rejected | BookingStatus::Other => {
            EventStatus::Tentative
        }
    }
}
