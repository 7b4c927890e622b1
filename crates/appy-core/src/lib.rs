// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Appy session and data-synchronization layer.
//!
//! This crate provides the error type, the canonical domain model and the
//! trait seams ([`TokenStore`], [`Backend`]) shared by the gateway, the
//! token vault and the data store.

pub mod error;
pub mod model;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AppyError;
pub use traits::{Backend, TokenStore};
pub use types::{CosmeticSlot, NotificationTarget, QuizRequest, RankingKind, Section};
