use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn quiet_settings_json() -> &'static str {
    r#"
{
  "version": 1,
  "default_input": "3",
  "alert": {
    "sound_enabled": false
  }
}
"#
}

#[test]
fn parse_prints_canonical_duration() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--parse")
        .arg("90")
        .assert()
        .success()
        .stdout(predicate::str::diff("00:01:30\n"));
}

#[test]
fn parse_carries_minutes_into_hours() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--parse")
        .arg("00:90:00")
        .assert()
        .success()
        .stdout(predicate::str::diff("01:30:00\n"));
}

#[test]
fn parse_rejects_invalid_input_with_format_hint() {
    for input in ["--parse=-5", "--parse=", "--parse=0", "--parse=abc"] {
        let mut cmd = cargo_bin_cmd!("countdown");
        cmd.arg(input)
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid duration"))
            .stderr(predicate::str::contains("HH:MM:SS"));
    }
}

#[test]
fn headless_counts_down_to_completion() {
    let dir = tempdir().expect("tempdir");
    let settings = dir.path().join("countdown.json");
    fs::write(&settings, quiet_settings_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--headless")
        .arg("--settings")
        .arg(settings)
        .arg("--tick-ms")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "00:00:03\n00:00:02\n00:00:01\n00:00:00\nTime's Up! Countdown Complete!\n",
        ));
}

#[test]
fn headless_duration_flag_overrides_settings() {
    let dir = tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--headless")
        .arg("--no-sound")
        .arg("--settings")
        .arg(dir.path().join("missing.json"))
        .arg("--duration")
        .arg("1:02")
        .arg("--tick-ms")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("00:01:02\n00:01:01\n"))
        .stdout(predicate::str::contains("Countdown Complete"));
}

#[test]
fn headless_rejects_invalid_duration() {
    let dir = tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--headless")
        .arg("--no-sound")
        .arg("--settings")
        .arg(dir.path().join("missing.json"))
        .arg("--duration")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}

#[test]
fn malformed_settings_fail_with_clear_error() {
    let dir = tempdir().expect("tempdir");
    let settings = dir.path().join("countdown.json");
    fs::write(&settings, "{ not-valid-json ").expect("write invalid json");

    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--headless")
        .arg("--settings")
        .arg(settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn zero_tick_interval_is_rejected() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--headless")
        .arg("--tick-ms")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tick-ms must be greater than zero"));
}
