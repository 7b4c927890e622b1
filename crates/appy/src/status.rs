// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `appy status` command implementation.
//!
//! Loads the stored session, checks it against the backend and reports
//! whether the user is signed in and when the access token expires.
//! Tokens are only ever shown masked.

use std::io::IsTerminal;

use appy_config::AppyConfig;
use appy_core::AppyError;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Client;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub authenticated: bool,
    pub valid: bool,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub expires_in_human: Option<String>,
    pub full_access: Option<bool>,
    pub base_url: String,
}

/// Format a remaining lifetime into a human-readable string.
fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        return "expired".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn remaining(expires_at_ms: i64, now: DateTime<Utc>) -> String {
    format_remaining((expires_at_ms - now.timestamp_millis()) / 1000)
}

/// Run the `appy status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &AppyConfig, json: bool, plain: bool) -> Result<(), AppyError> {
    let client = Client::connect(config).await?;
    let session = client.gateway.session_info().await?;
    let user_config = if session.authenticated {
        client.gateway.validate_session().await?
    } else {
        None
    };

    let status = StatusResponse {
        authenticated: session.authenticated,
        valid: user_config.is_some(),
        access_token: session.access_token,
        expires_at: session.expires_at,
        expires_in_human: session.expires_at.map(|at| remaining(at, Utc::now())),
        full_access: user_config.map(|c| c.full_access == 1),
        base_url: config.api.base_url.clone(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  appy status");
    println!("  {}", "-".repeat(35));

    let (ok, label) = match (status.authenticated, status.valid) {
        (true, true) => (true, "signed in"),
        (true, false) => (false, "session rejected"),
        (false, _) => (false, "signed out"),
    };
    if use_color {
        use colored::Colorize;
        if ok {
            println!("    Session:  {} {}", "✓".green(), label.green());
        } else {
            println!("    Session:  {} {}", "✗".red(), label.red());
        }
    } else {
        let mark = if ok { "[OK]" } else { "[FAIL]" };
        println!("    Session:  {mark} {label}");
    }

    if let Some(token) = &status.access_token {
        println!("    Token:    {token}");
    }
    if let Some(expires) = &status.expires_in_human {
        println!("    Expires:  {expires}");
    }
    println!("    Backend:  {}", status.base_url);
    println!();
    if !ok {
        println!("  Sign in with: appy login <email>");
        println!();
    }
}
