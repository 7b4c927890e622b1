// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the `appy` binary against a mock backend.
//!
//! Each test runs the binary in its own temp directory with a SQLite token
//! database, so sessions persist across invocations exactly as they would
//! for a user.

use std::path::Path;
use std::process::Output;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PASSWORD: &str = "correct horse";

async fn appy(server: &MockServer, home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_appy"))
        .args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("APPY_API_BASE_URL", format!("{}/", server.uri()))
        .env("APPY_STORAGE_BACKEND", "sqlite")
        .env("APPY_STORAGE_TOKEN_DB_PATH", home.join("tokens.db"))
        .env("APPY_PASSWORD", PASSWORD)
        .env("RUST_LOG", "off")
        .output()
        .await
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "accessToken": "access-token-0001",
            "refreshToken": "refresh-token-0001",
            "expiresIn": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logon_user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {
                "id": 42,
                "nickname": "ada",
                "organizationId": 7,
                "organizationName": "Lovelace Academy",
                "randomPosition": 1,
                "fullAccess": 1
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/app/gamification_user_badges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {"id": 42, "nickname": "ada", "coins": 120},
            "items": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/app/user_notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "notifications": [{"id": 1, "readAt": null}, {"id": 2, "readAt": "2026-01-01T00:00:00Z"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .with_priority(10)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn status_reports_signed_out_without_session() {
    let server = backend().await;
    let home = TempDir::new().unwrap();

    let output = appy(&server, home.path(), &["status", "--json"]).await;
    assert!(output.status.success());
    let status = stdout_json(&output);
    assert_eq!(status["authenticated"], false);
    assert_eq!(status["valid"], false);
    assert_eq!(status["accessToken"], Value::Null);
}

#[tokio::test]
async fn login_persists_session_for_later_commands() {
    let server = backend().await;
    let home = TempDir::new().unwrap();

    let login = appy(&server, home.path(), &["login", "ada@example.com"]).await;
    assert!(
        login.status.success(),
        "{}",
        String::from_utf8_lossy(&login.stderr)
    );
    assert!(String::from_utf8_lossy(&login.stdout).contains("Signed in as ada"));

    let status = stdout_json(&appy(&server, home.path(), &["status", "--json"]).await);
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["valid"], true);
    assert_eq!(status["fullAccess"], true);
    let token = status["accessToken"].as_str().unwrap();
    assert!(!token.contains("access-token-0001"));
}

#[tokio::test]
async fn sync_summarizes_loaded_sections() {
    let server = backend().await;
    let home = TempDir::new().unwrap();
    assert!(appy(&server, home.path(), &["login", "ada@example.com"])
        .await
        .status
        .success());

    let output = appy(&server, home.path(), &["sync", "--json"]).await;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary = stdout_json(&output);
    assert_eq!(summary["user"], "ada");
    assert_eq!(summary["coins"], 120);
    assert_eq!(summary["organization"], "Lovelace Academy");
    assert_eq!(summary["notifications"], 2);
    assert_eq!(summary["unreadNotifications"], 1);
    assert_eq!(summary["failedSections"], json!([]));
}

#[tokio::test]
async fn sync_without_session_exits_with_auth_code() {
    let server = backend().await;
    let home = TempDir::new().unwrap();

    let output = appy(&server, home.path(), &["sync"]).await;
    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test]
async fn logout_clears_the_stored_session() {
    let server = backend().await;
    let home = TempDir::new().unwrap();
    assert!(appy(&server, home.path(), &["login", "ada@example.com"])
        .await
        .status
        .success());

    let logout = appy(&server, home.path(), &["logout"]).await;
    assert!(logout.status.success());

    let status = stdout_json(&appy(&server, home.path(), &["status", "--json"]).await);
    assert_eq!(status["authenticated"], false);
}

#[tokio::test]
async fn rejected_login_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = appy(&server, home.path(), &["login", "ada@example.com"]).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid credentials"));
}
