use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[backend]"));
    assert!(contents.contains("compensate_failed_uploads = false"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_set_updates_value() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .args(["config", "set", "backend.project_id", "my-project"])
        .assert()
        .success();

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains(r#""my-project""#));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .args(["config", "set", "backend.nope", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_missing_backend_settings_are_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("megablog")
        .env("MEGABLOG_HOME", dir.path())
        .env_remove("MEGABLOG_APPWRITE_PROJECT_ID")
        .args(["posts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MEGABLOG_APPWRITE_PROJECT_ID"));
}
