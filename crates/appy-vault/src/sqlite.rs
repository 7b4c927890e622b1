// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed token store.
//!
//! All statements run on tokio-rusqlite's background thread. Multi-key
//! writes use a single transaction so a crash never leaves a half-written
//! session behind.

use std::path::Path;

use appy_core::{AppyError, TokenStore};
use async_trait::async_trait;
use rusqlite::params;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS session_tokens (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

const UPSERT: &str = "INSERT INTO session_tokens (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Persistent token store in a single SQLite file.
pub struct SqliteTokenStore {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for SqliteTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTokenStore").finish_non_exhaustive()
    }
}

impl SqliteTokenStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppyError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| AppyError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| AppyError::Storage {
                source: Box::new(e),
            })?;
        Self::from_connection(conn).await
    }

    /// In-memory database; used by tests and short-lived tools.
    pub async fn open_in_memory() -> Result<Self, AppyError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| AppyError::Storage {
                source: Box::new(e),
            })?;
        Self::from_connection(conn).await
    }

    async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self, AppyError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        debug!("token store schema ready");
        Ok(Self { conn })
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, AppyError> {
        let key = key.to_string();
        let value = self
            .conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT value FROM session_tokens WHERE key = ?1")?;
                match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;
        Ok(value.map(SecretString::from))
    }

    async fn set(&self, key: &str, value: SecretString) -> Result<(), AppyError> {
        self.set_many(vec![(key.to_string(), value)]).await
    }

    async fn delete(&self, key: &str) -> Result<(), AppyError> {
        self.delete_many(&[key]).await
    }

    async fn set_many(&self, entries: Vec<(String, SecretString)>) -> Result<(), AppyError> {
        let count = entries.len();
        let rows: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k, v.expose_secret().to_owned()))
            .collect();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(UPSERT)?;
                    for (key, value) in &rows {
                        stmt.execute(params![key, value])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        debug!(count, "session tokens written");
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<(), AppyError> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let count = keys.len();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare("DELETE FROM session_tokens WHERE key = ?1")?;
                    for key in &keys {
                        stmt.execute(params![key])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        debug!(count, "session tokens deleted");
        Ok(())
    }
}

/// Convert tokio-rusqlite errors to AppyError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> AppyError {
    AppyError::Storage {
        source: Box::new(e),
    }
}
