// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key/value storage for session credentials.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::AppyError;

/// Durable storage for the access token, refresh token and expiry.
///
/// Implementations must never expose a partially applied write: a
/// `set_many` or `delete_many` either lands completely or not at all.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Reads a value, `None` if the key was never written or was deleted.
    async fn get(&self, key: &str) -> Result<Option<SecretString>, AppyError>;

    /// Writes a single value, replacing any previous one.
    async fn set(&self, key: &str, value: SecretString) -> Result<(), AppyError>;

    /// Removes a single value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AppyError>;

    /// Writes several values atomically.
    async fn set_many(&self, entries: Vec<(String, SecretString)>) -> Result<(), AppyError>;

    /// Removes several values atomically.
    async fn delete_many(&self, keys: &[&str]) -> Result<(), AppyError>;
}
