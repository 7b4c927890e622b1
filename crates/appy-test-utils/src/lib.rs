// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Appy integration tests.
//!
//! Provides a scripted backend and canned payloads for fast,
//! deterministic tests of the data store without a running server.
//!
//! # Components
//!
//! - [`MockBackend`] - Scripted [`appy_core::Backend`] with call recording
//! - [`fixtures`] - JSON payloads shaped like real backend responses

pub mod fixtures;
pub mod mock_backend;

pub use mock_backend::{MockBackend, Route};
