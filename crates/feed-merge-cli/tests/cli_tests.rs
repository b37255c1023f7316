//! Integration tests for the `feedmerge` binary.
//!
//! These use `assert_cmd` and `predicates` to run the merge and extract
//! subcommands through the actual binary, including stdin piping, file
//! output, config overrides and failure exit codes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: path to the registry.json fixture.
fn registry_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/registry.json")
}

/// Helper: path to the airbnb.ics fixture.
fn airbnb_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/airbnb.ics")
}

fn feedmerge() -> Command {
    let mut cmd = Command::cargo_bin("feedmerge").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Merge subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn merge_registry_to_stdout() {
    feedmerge()
        .args(["merge", "--registry", registry_path()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//haven-calendar//Merged Calendar//EN\r\n",
        ))
        .stdout(predicate::str::contains("SUMMARY:Reservation Jane Doe\r\n"))
        .stdout(predicate::str::contains("DTSTART:20240601T000000Z\r\n"))
        .stdout(predicate::str::contains("SUMMARY:Owner stay\r\n"))
        .stdout(predicate::str::contains("STATUS:TENTATIVE\r\n"))
        .stdout(predicate::str::ends_with("END:VCALENDAR\r\n"));
}

#[test]
fn merge_lists_blocks_before_bookings() {
    let output = feedmerge()
        .args(["merge", "--registry", registry_path()])
        .output()
        .unwrap();
    let doc = String::from_utf8(output.stdout).unwrap();

    let block = doc.find("UID:block-12").unwrap();
    let newest_booking = doc.find("UID:bk-2024-0002").unwrap();
    let older_booking = doc.find("UID:bk-2024-0001").unwrap();
    assert!(block < newest_booking);
    assert!(newest_booking < older_booking);
}

#[test]
fn merge_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.ics");

    feedmerge()
        .args(["merge", "--registry", registry_path(), "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("CATEGORIES:Site\r\n"));
}

#[test]
fn product_id_override_reaches_the_envelope() {
    feedmerge()
        .args([
            "merge",
            "--registry",
            registry_path(),
            "--product-id",
            "ocean-haven",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "PRODID:-//ocean-haven//Merged Calendar//EN\r\n",
        ));
}

#[test]
fn config_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("merge.toml");
    std::fs::write(&config, "booking_summary_prefix = \"Stay:\"\n").unwrap();

    feedmerge()
        .args(["merge", "--registry", registry_path(), "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("SUMMARY:Stay: Jane Doe\r\n"));
}

#[test]
fn unknown_config_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("merge.toml");
    std::fs::write(&config, "timeout = 5\n").unwrap();

    feedmerge()
        .args(["merge", "--registry", registry_path(), "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn missing_registry_fails_the_merge() {
    feedmerge()
        .args(["merge", "--registry", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Storage error"));
}

#[test]
fn zero_in_flight_override_is_rejected() {
    feedmerge()
        .args(["merge", "--registry", registry_path(), "--max-in-flight", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_in_flight"));
}

#[tokio::test(flavor = "multi_thread")]
async fn merge_with_remote_feeds_tolerates_a_failing_source() {
    let server = MockServer::start().await;
    Mock::given(path("/airbnb.ics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(std::fs::read_to_string(airbnb_path()).unwrap()),
        )
        .mount(&server)
        .await;
    Mock::given(path("/vrbo.ics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("registry.json");
    std::fs::write(
        &registry,
        format!(
            r#"{{"sources": [
                {{"platform": "Airbnb", "url": "{uri}/airbnb.ics"}},
                {{"platform": "Vrbo", "url": "{uri}/vrbo.ics"}}
            ]}}"#,
            uri = server.uri()
        ),
    )
    .unwrap();

    let output = feedmerge()
        .arg("merge")
        .arg("--registry")
        .arg(&registry)
        .output()
        .unwrap();
    let doc = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(doc.matches("CATEGORIES:Airbnb\r\n").count(), 2);
    assert!(!doc.contains("CATEGORIES:Vrbo"));
    assert!(!doc.contains("1418fb94e984-a3"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Extract subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn extract_file_prints_complete_spans_only() {
    let output = feedmerge()
        .args(["extract", "-i", airbnb_path()])
        .output()
        .unwrap();
    let text = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(text.matches("BEGIN:VEVENT").count(), 2);
    assert!(text.contains("UID:1418fb94e984-a2@airbnb.com"));
    assert!(!text.contains("UID:1418fb94e984-a3@airbnb.com"));
    assert!(!text.contains("VCALENDAR"));
}

#[test]
fn extract_with_platform_tags_each_span() {
    feedmerge()
        .args(["extract", "-i", airbnb_path(), "--platform", "Airbnb"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "BEGIN:VEVENT\r\nCATEGORIES:Airbnb\r\nDTEND;VALUE=DATE:20240904",
        ));
}

#[test]
fn extract_stdin() {
    feedmerge()
        .arg("extract")
        .write_stdin("noise\nBEGIN:VEVENT\nUID:x\nEND:VEVENT\nmore noise\n")
        .assert()
        .success()
        .stdout("BEGIN:VEVENT\nUID:x\nEND:VEVENT\n");
}

#[test]
fn extract_empty_input_prints_nothing() {
    feedmerge()
        .arg("extract")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn extract_missing_file_fails() {
    feedmerge()
        .args(["extract", "-i", "/definitely/not/here.ics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument handling
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn subcommand_is_required() {
    feedmerge().assert().failure();
}

#[test]
fn merge_requires_a_registry() {
    feedmerge()
        .arg("merge")
        .env_remove("FEEDMERGE_REGISTRY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--registry"));
}
