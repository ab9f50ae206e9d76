//! Integration tests for the `smux` CLI binary.
//!
//! Argument parsing, help output and completions run without a server;
//! the request paths run against a wiremock stand-in.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `smux` binary with env isolation.
///
/// Clears all `SMUX_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn smux_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("smux");
    cmd.env("HOME", "/tmp/smux-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/smux-cli-test-nonexistent")
        .env_remove("SMUX_URL")
        .env_remove("SMUX_REQUEST_TIMEOUT_MS")
        .env_remove("SMUX_DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || smux_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut v = vec!["--url".to_owned(), server.uri()];
    v.extend(rest.iter().map(|s| (*s).to_owned()));
    v
}

fn status_body() -> serde_json::Value {
    json!({
        "api": "status",
        "strs": [{
            "name": "gps1", "type": "serial", "mode": "RW", "state": "connected",
            "opts": "serial:/dev/ttyUSB0,115200",
            "can": [true, true], "ena": [true, false],
            "stats": [{"n_msgs": 1500}, {"n_msgs": 0}]
        }],
        "muxs": [{
            "name": "gps1-tcp1", "src": "gps1", "dst": "tcp1",
            "can": [true, false], "ena": [true, false]
        }],
        "proc": {"pid": 4242, "time": "20250102T030405Z", "uptime": "0d 00:01:02"}
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = smux_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    smux_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("streammux")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("ctrl")),
    );
}

#[test]
fn test_version_flag() {
    smux_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("smux"));
}

#[test]
fn test_completions_bash() {
    smux_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("smux"));
}

#[test]
fn test_ctrl_requires_an_endpoint() {
    let output = smux_cmd().args(["ctrl", "gps1"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--a") || text.contains("-a"), "{text}");
}

#[test]
fn test_ctrl_rejects_bad_switch() {
    smux_cmd()
        .args(["ctrl", "gps1", "-a", "maybe"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_url_scheme() {
    let output = smux_cmd()
        .args(["--url", "ftp://example.org/", "version"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("smux::validation"));
}

#[test]
fn test_unreachable_server() {
    let output = smux_cmd()
        .args(["--url", "http://127.0.0.1:9/", "--timeout-ms", "500", "version"])
        .output()
        .unwrap();
    let code = output.status.code();
    assert!(code == Some(7) || code == Some(8), "unexpected exit {code:?}");
}

#[test]
fn test_config_path() {
    smux_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toml"));
}

#[test]
fn test_config_show_applies_flags() {
    smux_cmd()
        .args(["--url", "http://mux.local:9000/", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://mux.local:9000/"));
}

// ── Against a server ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_version_banner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api": "version",
            "version": "1.4.2",
            "copyright": "(c) streammux authors",
            "license": "GPL-3.0"
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["version"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Version: 1.4.2, (c) streammux authors, GPL-3.0"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "json", "status", "streams"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["name"], "gps1");
    assert_eq!(parsed[0]["stats"][0]["n_msgs"], 1500);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let output = run(args(&server, &["--color", "never", "status"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("gps1-tcp1"));
    assert!(text.contains("1'500"));
    assert!(text.contains("115200"));
    assert!(text.contains("2025-01-02 03:04:05 UTC"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ctrl_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ctrl"))
        .and(body_json(json!(["gps1", false, null])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api": "ctrl",
            "data": ["gps1", false, true]
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["--color", "never", "ctrl", "gps1", "-a", "off"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "gps1: A off, B on"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ctrl_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ctrl"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request data"))
        .mount(&server)
        .await;

    let output = run(args(&server, &["ctrl", "nope", "-b", "on"])).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("smux::rejected"));
}
