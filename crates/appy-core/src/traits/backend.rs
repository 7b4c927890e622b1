// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The slice of the backend API the data store consumes.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppyError;
use crate::types::{RankingKind, Section};

/// Remote data source for the data store.
///
/// Responses are returned as raw JSON; shape normalization is the data
/// store's job so that every envelope variant is handled in one place.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Fetches the raw payload backing one cache section.
    ///
    /// [`Section::Rankings`] is not a single endpoint; use
    /// [`Backend::fetch_rankings`] for it.
    async fn fetch_section(&self, section: Section) -> Result<Value, AppyError>;

    /// Fetches the ranking for one metric.
    async fn fetch_rankings(&self, kind: RankingKind) -> Result<Value, AppyError>;

    /// Fetches the logon user payload (user, organization and feature flags).
    async fn logon_user(&self) -> Result<Value, AppyError>;

    /// Confirms a cosmetic purchase.
    async fn purchase_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError>;

    /// Marks a notification read. `0` marks every notification.
    async fn mark_notification_read(&self, notification_id: i64) -> Result<Value, AppyError>;

    /// Equips an owned cosmetic on the server side.
    async fn use_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError>;

    async fn join_tribe(&self, tribe_id: i64) -> Result<Value, AppyError>;

    async fn leave_tribe(&self) -> Result<Value, AppyError>;
}
