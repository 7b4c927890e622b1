// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session token storage for the Appy sync layer.
//!
//! Two [`TokenStore`] implementations are provided: [`SqliteTokenStore`]
//! persists tokens across restarts, [`MemoryTokenStore`] keeps them only for
//! the lifetime of the process. [`open_token_store`] picks one from config.

pub mod keys;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use appy_config::model::{StorageBackend, StorageConfig};
use appy_core::{AppyError, TokenStore};

pub use keys::{mask_secret, ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS};
pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;

/// Opens the token store selected by `[storage]`.
pub async fn open_token_store(config: &StorageConfig) -> Result<Arc<dyn TokenStore>, AppyError> {
    match config.backend {
        StorageBackend::Sqlite => {
            let store = SqliteTokenStore::open(&config.token_db_path).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryTokenStore::new())),
    }
}
