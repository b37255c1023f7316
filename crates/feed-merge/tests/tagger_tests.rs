//! Tests for provenance tagging.

use feed_merge::tag_event;

fn count_lines(block: &str) -> usize {
    block.lines().count()
}

#[test]
fn inserts_category_right_after_begin_marker() {
    let block = "BEGIN:VEVENT\r\nUID:1\r\nEND:VEVENT";

    let tagged = tag_event(block, "Airbnb");

    assert_eq!(tagged, "BEGIN:VEVENT\r\nCATEGORIES:Airbnb\r\nUID:1\r\nEND:VEVENT");
}

#[test]
fn reuses_lf_line_endings() {
    let block = "BEGIN:VEVENT\nUID:1\nEND:VEVENT";

    let tagged = tag_event(block, "Booking.com");

    assert_eq!(tagged, "BEGIN:VEVENT\nCATEGORIES:Booking.com\nUID:1\nEND:VEVENT");
}

#[test]
fn leaves_the_rest_of_the_block_untouched() {
    let block = "BEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Reserved\r\nDTSTART;VALUE=DATE:20240601\r\nEND:VEVENT";

    let tagged = tag_event(block, "Vrbo");
    let removed = tagged.replacen("CATEGORIES:Vrbo\r\n", "", 1);

    assert_eq!(removed, block);
}

#[test]
fn already_categorized_block_gets_exactly_one_more_line() {
    let block = "BEGIN:VEVENT\r\nCATEGORIES:Imported\r\nUID:1\r\nEND:VEVENT";

    let tagged = tag_event(block, "Airbnb");

    assert_eq!(count_lines(&tagged), count_lines(block) + 1);
    assert_eq!(tagged.matches("CATEGORIES:").count(), 2);
    // The platform tag comes first.
    let first = tagged.lines().nth(1).unwrap();
    assert_eq!(first, "CATEGORIES:Airbnb");
}

#[test]
fn tagging_twice_adds_two_lines() {
    let block = "BEGIN:VEVENT\nUID:1\nEND:VEVENT";

    let once = tag_event(block, "Airbnb");
    let twice = tag_event(&once, "Airbnb");

    assert_eq!(count_lines(&twice), count_lines(block) + 2);
}

#[test]
fn platform_labels_are_text_escaped() {
    let tagged = tag_event("BEGIN:VEVENT\nEND:VEVENT", "Booking, Inc.\nEU");

    assert_eq!(tagged, "BEGIN:VEVENT\nCATEGORIES:Booking\\, Inc.\\nEU\nEND:VEVENT");
}

#[test]
fn block_without_begin_marker_is_returned_unchanged() {
    assert_eq!(tag_event("UID:1\nEND:VEVENT", "Airbnb"), "UID:1\nEND:VEVENT");
}
