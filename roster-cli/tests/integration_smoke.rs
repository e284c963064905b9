//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// === Serve Command Tests ===

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Storage backend"))
        .stdout(predicate::str::contains("SERVER_PORT"))
        .stdout(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_serve_rejects_unknown_backend() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("serve").arg("--backend").arg("sqlite");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown storage backend"));
}

#[test]
fn test_serve_postgres_without_settings_fails() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.current_dir(std::env::temp_dir())
        .env_remove("DATABASE_URL")
        .env_remove("DB_HOST")
        .env("ROSTER_BACKEND", "postgres")
        .arg("serve");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL or DB_HOST"));
}

// === Migrate Command Tests ===

#[test]
fn test_migrate_help() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("migrate").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Direction"));
}

#[test]
fn test_migrate_rejects_unknown_direction() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("migrate").arg("--dir").arg("sideways");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown migration direction"));
}

// === Completions Tests ===

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}
