use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("api_endpoint"));
    assert!(contents.contains("landing_route"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_applies_overrides_in_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "api_endpoint = \"http://from-file:1\"\nlanding_route = \"/home\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .env("DOORMAN_API_ENDPOINT", "http://from-env:2")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-env:2"))
        .stdout(predicate::str::contains("/home"));

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .env("DOORMAN_API_ENDPOINT", "http://from-env:2")
        .args(["--endpoint", "http://from-flag:3", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-flag:3"));
}

#[test]
fn test_invalid_endpoint_is_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("doorman")
        .env("DOORMAN_HOME", dir.path())
        .args(["--endpoint", "ftp://example.com"])
        .args(["login", "--username", "alice", "--password-stdin"])
        .write_stdin("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp://example.com"));
}
