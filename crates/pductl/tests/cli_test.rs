//! Integration tests for the `pductl` CLI binary.
//!
//! These tests validate argument parsing, offline cache commands, and error
//! handling without a live PDU.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "\
; Config.ini for an APC network management card
[SystemID]
Name=unit1
Contact=Alice
[NetworkTCP/IP]
IPAddress=10.0.0.5
";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `pductl` binary with env isolation.
///
/// Clears all `PDUCTL_*` env vars and points config and cache directories
/// into `home` so tests never touch the user's real configuration.
fn pductl_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pductl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env_remove("RUST_LOG")
        .env_remove("PDUCTL_DEVICE")
        .env_remove("PDUCTL_DEFAULT_DEVICE")
        .env_remove("PDUCTL_CACHE_DIR")
        .env_remove("PDUCTL_USERNAME")
        .env_remove("PDUCTL_PASSWORD");
    cmd
}

/// A temp home with `SAMPLE` cached for 10.0.0.5.
fn home_with_cache() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let cache = home.path().join("pdus");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::write(cache.join("10.0.0.5.ini"), SAMPLE).unwrap();
    home
}

fn cache_arg(home: &TempDir) -> String {
    home.path().join("pdus").display().to_string()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    pductl_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("fetch")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("set")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    pductl_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pductl"));
}

// ── Offline cache commands ──────────────────────────────────────────

#[test]
fn test_show_prints_cached_document() {
    let home = home_with_cache();
    pductl_cmd(home.path())
        .args(["show", "-d", "10.0.0.5", "--cache-dir", &cache_arg(&home)])
        .assert()
        .success()
        .stdout(predicate::str::contains("[SystemID]\nName=unit1\nContact=Alice"))
        .stdout(predicate::str::contains("; Config.ini").not());
}

#[test]
fn test_show_json_output() {
    let home = home_with_cache();
    let output = pductl_cmd(home.path())
        .args(["show", "-d", "10.0.0.5", "-o", "json", "--cache-dir"])
        .arg(cache_arg(&home))
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["SystemID"]["Contact"], "Alice");
}

#[test]
fn test_verbose_logs_stay_off_stdout() {
    let home = home_with_cache();
    let output = pductl_cmd(home.path())
        .args(["show", "-d", "10.0.0.5", "-o", "json", "-vv", "--cache-dir"])
        .arg(cache_arg(&home))
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["SystemID"]["Name"], "unit1");
}

#[test]
fn test_show_pending_reads_separate_file() {
    let home = home_with_cache();
    std::fs::write(
        home.path().join("pdus").join("10.0.0.5.ini_updated"),
        "[SystemID]\nContact=Bob\n",
    )
    .unwrap();

    pductl_cmd(home.path())
        .args(["show", "--pending", "-d", "10.0.0.5", "--cache-dir"])
        .arg(cache_arg(&home))
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact=Bob"));
}

#[test]
fn test_show_without_cache_is_not_found() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path())
        .args(["show", "-d", "10.0.0.5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("No cached configuration"), "got:\n{text}");
}

#[test]
fn test_get_prints_single_value() {
    let home = home_with_cache();
    pductl_cmd(home.path())
        .args(["get", "SystemID.Contact", "-d", "10.0.0.5", "--cache-dir"])
        .arg(cache_arg(&home))
        .assert()
        .success()
        .stdout("Alice\n");
}

#[test]
fn test_get_section_with_slash() {
    let home = home_with_cache();
    pductl_cmd(home.path())
        .args(["get", "NetworkTCP/IP.IPAddress", "-d", "10.0.0.5", "--cache-dir"])
        .arg(cache_arg(&home))
        .assert()
        .success()
        .stdout("10.0.0.5\n");
}

#[test]
fn test_get_missing_setting() {
    let home = home_with_cache();
    let output = pductl_cmd(home.path())
        .args(["get", "SystemID.Location", "-d", "10.0.0.5", "--cache-dir"])
        .arg(cache_arg(&home))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_uses_default_device_from_config_file() {
    let home = home_with_cache();
    let config_dir = home.path().join("config").join("pductl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "default_device = \"rack-a\"\n\n[defaults]\ncache_dir = {:?}\n\n\
             [devices.rack-a]\naddress = \"10.0.0.5\"\n",
            cache_arg(&home)
        ),
    )
    .unwrap();

    pductl_cmd(home.path())
        .args(["get", "SystemID.Name"])
        .assert()
        .success()
        .stdout("unit1\n");
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_address_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path())
        .args(["show", "-d", "192.168.1.256"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("192.168.1.256"), "got:\n{text}");
}

#[test]
fn test_no_device_selected() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path()).arg("show").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("default_device"));
}

#[test]
fn test_malformed_assignment_rejected_by_parser() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path())
        .args(["set", "SystemID.Contact", "-d", "10.0.0.5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Section.Key=Value"));
}

#[test]
fn test_unwritable_setting_rejected_by_parser() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path())
        .args(["set", "SystemID.;x=1", "-d", "10.0.0.5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("cannot be written"), "got:\n{text}");
    assert!(!text.contains("Pushed"), "got:\n{text}");
}

#[test]
fn test_malformed_config_file_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config").join("pductl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "default_device = [\n").unwrap();

    let output = pductl_cmd(home.path()).arg("show").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config.toml"), "got:\n{text}");
    assert!(!text.contains("no default_device configured"), "got:\n{text}");
}

#[test]
fn test_fetch_without_credentials() {
    let home = tempfile::tempdir().unwrap();
    let output = pductl_cmd(home.path())
        .args(["fetch", "-d", "10.0.0.5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No credentials"));
}

#[test]
fn test_fetch_unreachable_device() {
    // Reserve a port, then free it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config").join("pductl");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "[devices.lab]\naddress = \"127.0.0.1\"\nusername = \"apc\"\n\
             password = \"apc\"\nport = {port}\ntimeout = 5\n"
        ),
    )
    .unwrap();

    let output = pductl_cmd(home.path())
        .args(["fetch", "-d", "lab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("Could not reach PDU"));
}
