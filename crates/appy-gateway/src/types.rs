// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the auth endpoints and the generic request surface.

use appy_core::model::User;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `api/auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `api/auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Token triple returned by login and refresh.
///
/// `expires_in` is relative seconds; `expires_at` is absolute epoch millis.
/// The backend sends one or the other.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TokenResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub expires_at: Option<i64>,
}

/// Options for a single gateway request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Send without `Authorization` and without refresh or retry.
    pub skip_auth: bool,
}

impl Default for RequestOptions {
    /// Backend calls default to `POST`.
    fn default() -> Self {
        Self {
            method: Method::POST,
            body: None,
            skip_auth: false,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The logged-in user from `logon_user`, when that follow-up call succeeded.
    pub user: Option<User>,
    /// Full login response with `user` merged in.
    pub raw: Value,
}

/// Response of `api/auth/forgot-password` and `api/auth/change_password`.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResponse {
    pub success: bool,
    pub message: String,
    /// HTTP status; only set for unauthenticated calls that bypass error mapping.
    pub status: Option<u16>,
    pub raw: Value,
}

impl PasswordResponse {
    pub(crate) fn from_body(body: Value, status: Option<u16>) -> Self {
        Self {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(false),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("No message provided")
                .to_string(),
            status,
            raw: body,
        }
    }
}

/// Snapshot of the session for display; tokens are masked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub authenticated: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}
