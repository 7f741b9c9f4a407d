//! Tests for the `reghunt` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use regf::value::encode_utf16le_string;
use regf::{HiveBuilder, ValueType};
use std::path::Path;
use tempfile::TempDir;

fn reghunt() -> Command {
    Command::cargo_bin("reghunt").unwrap()
}

fn hive_dir(root: &Path) -> std::path::PathBuf {
    let dir = root.join("hives");
    std::fs::create_dir(&dir).unwrap();
    let mut b = HiveBuilder::new("ROOT");
    let run = b.add_key(b.root(), "Run");
    b.add_value(run, "Updater", ValueType::Sz, encode_utf16le_string("C:\\Temp\\evil.exe"));
    std::fs::write(dir.join("NTUSER.DAT"), b.build().bytes).unwrap();
    dir
}

#[test]
fn test_directory_search_saves_json() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "EVIL", "-d"])
        .arg(&dir)
        .args(["-f", "json", "-o", "found"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Results saved to found.json"));

    let body = std::fs::read_to_string(tmp.path().join("found.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed[0]["path"], "ROOT\\Run");
    assert_eq!(parsed[0]["name"], "Updater");
}

#[test]
fn test_default_output_is_txt() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "evil", "-d"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("registry_results.txt"));
    assert!(tmp.path().join("registry_results.txt").exists());
}

#[test]
fn test_no_matches_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "not-present-anywhere", "-d"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("[!] No results found. Nothing was saved."));
    assert!(!tmp.path().join("registry_results.txt").exists());
}

#[test]
fn test_invalid_regex_fails_before_search() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "(unclosed", "--regex", "-d"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid search pattern"));
}

#[test]
fn test_unknown_format_fails() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "evil", "-f", "yaml", "-d"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn test_no_roots_is_an_error() {
    reghunt()
        .args(["-i", "evil"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no search roots"));
}

#[test]
fn test_missing_keyword_is_usage_error() {
    reghunt().args(["-d", "."]).assert().failure();
}

#[cfg(not(windows))]
#[test]
fn test_live_is_skipped_off_windows() {
    let tmp = TempDir::new().unwrap();
    let dir = hive_dir(tmp.path());
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "evil", "--live", "-d"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping live search."))
        .stdout(predicate::str::contains("[+] Results saved to"));
}

#[test]
fn test_missing_directory_saves_nothing() {
    let tmp = TempDir::new().unwrap();
    reghunt()
        .current_dir(tmp.path())
        .args(["-i", "evil", "-d", "no-such-dir"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[!] Directory not found: no-such-dir"))
        .stdout(predicate::str::contains("[!] No results found. Nothing was saved."));
    assert!(!tmp.path().join("registry_results.txt").exists());
}
