// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local token store.

use std::collections::HashMap;
use std::sync::Mutex;

use appy_core::{AppyError, TokenStore};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Token store backed by a `HashMap`; nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, SecretString>>,
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore")
            .field("entries", &"[REDACTED]")
            .finish()
    }
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SecretString>>, AppyError> {
        self.entries
            .lock()
            .map_err(|_| AppyError::Internal("token store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, AppyError> {
        Ok(self
            .lock()?
            .get(key)
            .map(|v| SecretString::from(v.expose_secret().to_owned())))
    }

    async fn set(&self, key: &str, value: SecretString) -> Result<(), AppyError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppyError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, SecretString)>) -> Result<(), AppyError> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert(key, value);
        }
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<(), AppyError> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
