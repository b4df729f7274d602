//! Integration tests for the `placeos` CLI binary.
//!
//! Argument parsing, completions and config errors run without an engine;
//! the remaining tests drive the binary against a wiremock engine.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `placeos` binary with env isolation.
///
/// Clears every `PLACEOS_*` variable the CLI reads and points the config
/// file at a path that does not exist.
fn placeos_cmd(config_dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("placeos");
    cmd.env("PLACEOS_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("PLACEOS_PROFILE")
        .env_remove("PLACEOS_HOST")
        .env_remove("PLACEOS_USERNAME")
        .env_remove("PLACEOS_CLIENT_ID")
        .env_remove("PLACEOS_PASSWORD")
        .env_remove("PLACEOS_CLIENT_SECRET")
        .env_remove("PLACEOS_OUTPUT")
        .env_remove("PLACEOS_INSECURE")
        .env_remove("PLACEOS_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// A command wired to `server` purely through flags and environment.
fn engine_cmd(config_dir: &tempfile::TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = placeos_cmd(config_dir);
    cmd.env("PLACEOS_HOST", server.uri())
        .env("PLACEOS_USERNAME", "support@place.tech")
        .env("PLACEOS_CLIENT_ID", "app-id")
        .env("PLACEOS_PASSWORD", "development")
        .env("PLACEOS_CLIENT_SECRET", "app-secret")
        .env("PLACEOS_TIMEOUT", "5");
    cmd
}

async fn engine() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cli-token",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "ref-1"
        })))
        .mount(&server)
        .await;
    server
}

async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    placeos_cmd(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("PlaceOS engine")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("commits")),
    );
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    placeos_cmd(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_unknown_kind_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    placeos_cmd(&dir)
        .args(["list", "triggers"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("triggers"));
}

#[test]
fn test_no_engine_configured() {
    let dir = tempfile::tempdir().unwrap();
    placeos_cmd(&dir)
        .args(["list", "zones"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No engine configured"));
}

#[test]
fn test_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[profiles.dev]\nhost = \"https://placeos.example.com\"\n",
    )
    .unwrap();

    placeos_cmd(&dir)
        .args(["--profile", "prod", "list", "zones"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prod").and(predicate::str::contains("dev")));
}

// ── Against an engine ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_get_driver_as_json() {
    let server = engine().await;
    Mock::given(method("GET"))
        .and(path("/api/engine/v2/drivers/driver-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "driver-1",
            "name": "Lutron",
            "role": 1,
            "module_name": "Lighting"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = engine_cmd(&dir, &server);
    cmd.args(["-o", "json-compact", "get", "driver", "driver-1"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["id"], "driver-1");
    assert_eq!(body["module_name"], "Lighting");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_creates_from_yaml() {
    let server = engine().await;
    Mock::given(method("POST"))
        .and(path("/api/engine/v2/zones"))
        .and(wiremock::matchers::body_json(json!({"name": "Level 3", "tags": ["level"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "zone-3",
            "name": "Level 3",
            "tags": ["level"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("zone.yaml");
    std::fs::write(&file, "name: Level 3\ntags:\n  - level\n").unwrap();

    let mut cmd = engine_cmd(&dir, &server);
    cmd.args(["-o", "plain", "apply", "zone"]).arg(&file);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "zone-3");
    assert!(String::from_utf8_lossy(&output.stderr).contains("zone 'zone-3' created"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_last_commit_of_empty_history_is_not_found() {
    let server = engine().await;
    Mock::given(method("GET"))
        .and(path("/api/engine/v2/repositories/repo-1/commits"))
        .and(query_param("driver", "drivers/lutron/lighting.cr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = engine_cmd(&dir, &server);
    cmd.args(["commits", "repo-1", "drivers/lutron/lighting.cr", "--last"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{output:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = engine_cmd(&dir, &server);
    cmd.args(["list", "zones"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{output:?}");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("app-secret"));
}
