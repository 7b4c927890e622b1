// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic mutations as explicit deltas.
//!
//! A [`Mutation`] is a list of forward [`Delta`]s. Every delta records the
//! value it replaces and the value it writes, and only takes effect while
//! the target still holds the value it replaces. Reverting a mutation after
//! a refresh or a later local change therefore leaves the newer value alone.

use crate::data::AppData;

/// One reversible change to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// Changes the user's coin balance.
    SetCoins { from: i64, to: i64 },
    /// Flips a cosmetic's `acquired` flag.
    SetAcquired { cosmetic_id: i64, from: i64, to: i64 },
    /// Changes a notification's `readAt`.
    SetReadAt {
        notification_id: i64,
        from: Option<String>,
        to: Option<String>,
    },
}

impl Delta {
    pub fn inverse(&self) -> Delta {
        match self {
            Delta::SetCoins { from, to } => Delta::SetCoins {
                from: *to,
                to: *from,
            },
            Delta::SetAcquired {
                cosmetic_id,
                from,
                to,
            } => Delta::SetAcquired {
                cosmetic_id: *cosmetic_id,
                from: *to,
                to: *from,
            },
            Delta::SetReadAt {
                notification_id,
                from,
                to,
            } => Delta::SetReadAt {
                notification_id: *notification_id,
                from: to.clone(),
                to: from.clone(),
            },
        }
    }

    /// Writes `to` if the target still holds `from`. Returns whether it did.
    pub fn apply(&self, data: &mut AppData) -> bool {
        match self {
            Delta::SetCoins { from, to } => {
                match data.user_info.as_mut().and_then(|info| info.user.as_mut()) {
                    Some(user) if user.coins == *from => {
                        user.coins = *to;
                        true
                    }
                    _ => false,
                }
            }
            Delta::SetAcquired {
                cosmetic_id,
                from,
                to,
            } => match data
                .cosmetics
                .iter_mut()
                .find(|c| c.id == *cosmetic_id && c.acquired == *from)
            {
                Some(item) => {
                    item.acquired = *to;
                    true
                }
                None => false,
            },
            Delta::SetReadAt {
                notification_id,
                from,
                to,
            } => match data
                .notifications
                .iter_mut()
                .find(|n| n.id == *notification_id && n.read_at == *from)
            {
                Some(n) => {
                    n.read_at = to.clone();
                    true
                }
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    forward: Vec<Delta>,
}

impl Mutation {
    pub fn new(forward: Vec<Delta>) -> Self {
        Self { forward }
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn forward(&self) -> &[Delta] {
        &self.forward
    }

    /// Inverse deltas, last forward delta first.
    pub fn inverse(&self) -> Vec<Delta> {
        self.forward.iter().rev().map(Delta::inverse).collect()
    }

    pub fn apply(&self, data: &mut AppData) {
        for delta in &self.forward {
            delta.apply(data);
        }
    }

    /// Applies the inverse. Returns how many deltas were skipped because
    /// their target moved on since.
    pub fn revert(&self, data: &mut AppData) -> usize {
        self.inverse()
            .iter()
            .filter(|delta| !delta.apply(data))
            .count()
    }
}
