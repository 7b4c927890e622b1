// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the sync layer's components.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for mocks in tests.

pub mod backend;
pub mod token_store;

pub use backend::Backend;
pub use token_store::TokenStore;
