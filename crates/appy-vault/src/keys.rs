// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage keys for the persisted session.

pub const ACCESS_TOKEN_KEY: &str = "appybrain_access_token";
pub const REFRESH_TOKEN_KEY: &str = "appybrain_refresh_token";
/// Absolute expiry, epoch milliseconds as a decimal string.
pub const EXPIRES_AT_KEY: &str = "appybrain_expires_at";

/// Every key that makes up a session, for atomic clears.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY];

/// Mask a token for display: `"eyJh...9xQk"`.
///
/// Shows prefix (up to 4 chars) and suffix (up to 4 chars) with "..." in between.
/// Short values (< 10 chars) are fully masked as "****".
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{prefix}...{suffix}")
}
