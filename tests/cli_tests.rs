//! Binary tests for argument handling and configuration errors

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trimx(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trimx").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("TRIMX_LOG_FORMAT")
        .env_remove("TRIMX_TICK_INTERVAL_MS");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    trimx(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("clip")
            .and(predicate::str::contains("silence"))
            .and(predicate::str::contains("keyframe"))
            .and(predicate::str::contains("batch")),
    );
}

#[test]
fn test_clip_requires_range() {
    let dir = TempDir::new().unwrap();
    trimx(&dir)
        .args(["clip", "-i", "in.mp4", "-o", "out.mp4"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_direction_is_rejected() {
    let dir = TempDir::new().unwrap();
    trimx(&dir)
        .args(["keyframe", "-i", "in.mp4", "--at", "10", "--direction", "sideways"])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file_fails_before_running() {
    let dir = TempDir::new().unwrap();
    trimx(&dir)
        .args(["--config", "missing.toml", "silence", "-i", "in.mkv", "-s", "1", "-e", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn test_bad_log_format_from_environment() {
    let dir = TempDir::new().unwrap();
    trimx(&dir)
        .env("TRIMX_LOG_FORMAT", "xml")
        .args(["silence", "-i", "in.mkv", "-s", "1", "-e", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log format 'xml'"));
}

#[test]
fn test_invalid_default_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("trimx.toml"), "[engine]\ntick_interval_ms = \"soon\"\n")
        .unwrap();

    trimx(&dir)
        .args(["silence", "-i", "in.mkv", "-s", "1", "-e", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trimx.toml"));
}
