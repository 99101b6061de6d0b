//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and the
//! offline subcommands produce their expected output.

#![allow(deprecated)] // cargo_bin deprecation — replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `streamscout` binary.
fn streamscout() -> Command {
    Command::cargo_bin("streamscout").expect("binary 'streamscout' should be built")
}

#[test]
fn help_flag_shows_usage() {
    streamscout()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: streamscout"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("sources"));
}

#[test]
fn version_flag_shows_semver() {
    streamscout()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^streamscout \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn sources_lists_fallback_order() {
    streamscout()
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("vidsrc"))
        .stdout(predicate::str::contains("multiembed"))
        .stdout(predicate::str::contains("embed_probe"));
}

#[test]
fn resolve_requires_imdb_id() {
    streamscout().arg("resolve").assert().failure();
}

#[test]
fn search_without_api_key_fails_cleanly() {
    streamscout()
        .arg("search")
        .arg("matrix")
        .env_remove("OMDB_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OMDB_API_KEY"));
}

#[test]
fn unknown_subcommand_fails() {
    streamscout().arg("frobnicate").assert().failure();
}
