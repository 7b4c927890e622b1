// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-memory session and its mirror in the token store.
//!
//! Token store failures never reach callers: a failed read is treated as
//! "no session" and a failed write only leaves the on-disk copy behind.

use std::sync::Arc;

use appy_core::TokenStore;
use appy_vault::{mask_secret, ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::types::SessionInfo;

/// Access token, refresh token and absolute expiry (epoch millis).
#[derive(Default)]
pub(crate) struct Session {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Reads the persisted session. Any store error yields an empty session.
    pub async fn load(store: &Arc<dyn TokenStore>) -> Self {
        let read = async {
            let access_token = store.get(ACCESS_TOKEN_KEY).await?;
            let refresh_token = store.get(REFRESH_TOKEN_KEY).await?;
            let expires_at = store
                .get(EXPIRES_AT_KEY)
                .await?
                .and_then(|v| v.expose_secret().trim().parse::<i64>().ok());
            Ok::<_, appy_core::AppyError>(Self {
                access_token,
                refresh_token,
                expires_at,
            })
        };

        match read.await {
            Ok(session) => {
                debug!(
                    has_access = session.access_token.is_some(),
                    has_refresh = session.refresh_token.is_some(),
                    expires_at = ?session.expires_at,
                    "session loaded"
                );
                session
            }
            Err(e) => {
                warn!(error = %e, "failed to load session, starting signed out");
                Self::default()
            }
        }
    }

    /// Writes every present field in one atomic store call.
    pub async fn persist(&self, store: &Arc<dyn TokenStore>) {
        let mut entries = Vec::with_capacity(3);
        if let Some(token) = &self.access_token {
            entries.push((ACCESS_TOKEN_KEY.to_string(), clone_secret(token)));
        }
        if let Some(token) = &self.refresh_token {
            entries.push((REFRESH_TOKEN_KEY.to_string(), clone_secret(token)));
        }
        if let Some(expires_at) = self.expires_at {
            entries.push((EXPIRES_AT_KEY.to_string(), expires_at.to_string().into()));
        }
        if entries.is_empty() {
            return;
        }
        if let Err(e) = store.set_many(entries).await {
            warn!(error = %e, "failed to persist session");
        }
    }

    /// Forgets the session in memory, then removes it from the store.
    pub async fn clear(&mut self, store: &Arc<dyn TokenStore>) -> Result<(), appy_core::AppyError> {
        *self = Self::default();
        store.delete_many(&SESSION_KEYS).await.inspect_err(|e| {
            warn!(error = %e, "failed to clear persisted session");
        })
    }

    /// True when both tokens are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// True when the access token is past, or within `buffer_ms` of, its expiry.
    ///
    /// A token without a known expiry is never considered expiring.
    pub fn is_expiring(&self, now_ms: i64, buffer_ms: i64) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now_ms >= expires_at.saturating_sub(buffer_ms),
            _ => false,
        }
    }

    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret()))
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            authenticated: self.is_authenticated(),
            access_token: self.access_token.as_ref().map(|t| mask_secret(t.expose_secret())),
            refresh_token: self.refresh_token.as_ref().map(|t| mask_secret(t.expose_secret())),
            expires_at: self.expires_at,
        }
    }
}

fn clone_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// Absolute expiry from a relative `expires_in` in seconds.
pub(crate) fn expiry_from_now(now_ms: i64, expires_in_secs: u64) -> i64 {
    now_ms.saturating_add((expires_in_secs as i64).saturating_mul(1000))
}
