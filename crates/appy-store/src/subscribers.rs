// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observer registry.
//!
//! Callbacks run synchronously on the mutating task, in subscription order.
//! A panicking callback is logged and does not stop the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::warn;

use crate::data::AppData;

/// Observer callback: `(data, loading, error)`.
pub type Callback = dyn Fn(&Arc<AppData>, bool, Option<&str>) + Send + Sync;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: Mutex<u64>,
    entries: Mutex<Vec<(u64, Arc<Callback>)>>,
}

impl Subscribers {
    pub fn add(self: &Arc<Self>, callback: Arc<Callback>) -> Subscription {
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            *next
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry, _)| *entry != id);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn notify(&self, data: &Arc<AppData>, loading: bool, error: Option<&str>) {
        // Callbacks may subscribe or unsubscribe, so run them on a copy.
        let callbacks: Vec<Arc<Callback>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(data, loading, error))).is_err() {
                warn!("subscriber panicked during notification");
            }
        }
    }
}

/// Keeps a callback registered until dropped or [`Subscription::unsubscribe`]d.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
