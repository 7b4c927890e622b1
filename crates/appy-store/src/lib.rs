// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local data store for the Appy client.
//!
//! [`DataStore`] is the single source of truth for cached domain data. It
//! pulls sections through a [`appy_core::Backend`], normalizes envelopes,
//! rewrites image URLs through a session [`ImageCache`], applies optimistic
//! mutations with explicit inverse deltas, gates ranking replacement on
//! change detection, and notifies subscribers synchronously after every
//! change.

mod accessors;
pub mod data;
pub mod delta;
pub mod freshness;
pub mod images;
pub mod normalize;
pub mod rankings;
pub mod rewrite;
pub mod store;
pub mod subscribers;
pub mod views;

pub use data::{AppData, LoadStatus, Rankings};
pub use delta::{Delta, Mutation};
pub use freshness::{FreshnessPolicy, FreshnessReport};
pub use images::{HttpImageFetcher, ImageCache, ImageFetcher, PassthroughFetcher};
pub use store::{ChangeSet, DataStore, EquipSelection, LoadReport, PurchaseReceipt};
pub use subscribers::Subscription;
pub use views::{BattleHistory, BattleOutcome, HistoryItem, UserProfile, UserStats};
