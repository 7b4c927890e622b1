// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Appy sync layer.

use thiserror::Error;

/// The primary error type shared by the gateway, the token store and the data store.
#[derive(Debug, Error)]
pub enum AppyError {
    /// Configuration errors (invalid TOML, bad base URL, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Token store errors (database open, query failure, corrupted value).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The session is missing or no longer valid. The session has been cleared.
    #[error("unauthorized: session expired")]
    Unauthorized,

    /// The backend refused the request for the current identity.
    #[error("forbidden")]
    Forbidden,

    /// A locally validated entity does not exist (e.g. unknown cosmetic).
    #[error("not found: {0}")]
    NotFound(String),

    /// A locally validated state conflict (e.g. cosmetic already owned).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The user's balance does not cover the price of an item.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Any other non-2xx response.
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Transport-level failure; no response was received.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The refresh endpoint rejected the refresh token (401/403).
    #[error("refresh token expired")]
    RefreshTokenExpired,

    /// Login was rejected or the login response was malformed.
    #[error("login failed: {message}")]
    Login { message: String, status: Option<u16> },

    /// Logout could not be completed remotely.
    #[error("logout failed: {message}")]
    Logout { message: String },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// `refresh_section` was asked for a section that has no endpoint.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// The gateway worker has stopped and no longer accepts commands.
    #[error("gateway closed")]
    Closed,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppyError {
    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppyError::Unauthorized | AppyError::RefreshTokenExpired => Some(401),
            AppyError::Forbidden => Some(403),
            AppyError::RequestFailed { status, .. } => Some(*status),
            AppyError::Login { status, .. } => *status,
            _ => None,
        }
    }

    /// True when the error means the user has to sign in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppyError::Unauthorized | AppyError::RefreshTokenExpired)
    }

    /// Wraps a decode failure from serde_json.
    pub fn decode(context: &str, err: serde_json::Error) -> Self {
        AppyError::Decode {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
