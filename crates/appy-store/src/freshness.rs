// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data freshness policy.
//!
//! The store only reports staleness; whether to reload is the caller's
//! decision (or `check_data_freshness(true)`).

use appy_config::model::FreshnessConfig;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub stale_after: TimeDelta,
    pub background_threshold: TimeDelta,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            stale_after: TimeDelta::minutes(5),
            background_threshold: TimeDelta::minutes(5),
        }
    }
}

impl From<&FreshnessConfig> for FreshnessPolicy {
    fn from(config: &FreshnessConfig) -> Self {
        let minutes = |m: u64| {
            i64::try_from(m)
                .ok()
                .and_then(TimeDelta::try_minutes)
                .unwrap_or(TimeDelta::MAX)
        };
        Self {
            stale_after: minutes(config.stale_after_minutes),
            background_threshold: minutes(config.background_threshold_minutes),
        }
    }
}

impl FreshnessPolicy {
    /// Data never loaded is stale.
    pub fn is_stale_at(&self, last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_updated {
            Some(at) => now - at >= self.stale_after,
            None => true,
        }
    }

    /// Whether a return to the foreground at `now` calls for a reload.
    pub fn should_reload_at(
        &self,
        last_updated: Option<DateTime<Utc>>,
        backgrounded_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let away_too_long = backgrounded_at.is_some_and(|at| now - at > self.background_threshold);
        self.is_stale_at(last_updated, now) || away_too_long
    }
}

/// Result of `check_data_freshness`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReport {
    pub is_stale: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub minutes_since_update: Option<i64>,
    pub reloaded: bool,
    pub reload_error: Option<String>,
}

impl FreshnessReport {
    pub fn at(policy: &FreshnessPolicy, last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            is_stale: policy.is_stale_at(last_updated, now),
            last_updated,
            minutes_since_update: last_updated.map(|at| (now - at).num_seconds().saturating_add(30) / 60),
            reloaded: false,
            reload_error: None,
        }
    }
}
