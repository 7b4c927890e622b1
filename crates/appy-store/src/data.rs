// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cached snapshot handed to readers and subscribers.

use std::collections::BTreeMap;
use std::sync::Arc;

use appy_core::model::{
    Area, Battle, Challenge, Cosmetic, NewsItem, Notification, OrganizationInfo, Quote,
    RankingSnapshot, Tribe, UserInfo, UserStars,
};
use appy_core::{RankingKind, Section};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Cached ranking per metric.
///
/// Snapshots sit behind an `Arc` so that an unchanged ranking keeps its
/// identity across refreshes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub points: Option<Arc<RankingSnapshot>>,
    pub stars: Option<Arc<RankingSnapshot>>,
    pub xp: Option<Arc<RankingSnapshot>>,
}

impl Rankings {
    pub fn get(&self, kind: RankingKind) -> Option<&Arc<RankingSnapshot>> {
        self.slot(kind).as_ref()
    }

    fn slot(&self, kind: RankingKind) -> &Option<Arc<RankingSnapshot>> {
        match kind {
            RankingKind::Points => &self.points,
            RankingKind::Stars => &self.stars,
            RankingKind::Xp => &self.xp,
        }
    }

    pub fn set(&mut self, kind: RankingKind, snapshot: Option<Arc<RankingSnapshot>>) {
        let slot = match kind {
            RankingKind::Points => &mut self.points,
            RankingKind::Stars => &mut self.stars,
            RankingKind::Xp => &mut self.xp,
        };
        *slot = snapshot;
    }
}

/// Every cached section plus freshness stamps.
///
/// A snapshot is immutable once published; writers clone it, change the
/// clone and publish the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppData {
    pub user_info: Option<UserInfo>,
    pub organization_info: Option<OrganizationInfo>,
    pub disciplines: Vec<Area>,
    pub user_stars: Option<UserStars>,
    /// Chest payload, kept as sent; the client only forwards it.
    pub user_chests: Option<Value>,
    pub tribes: Vec<Tribe>,
    pub rankings: Rankings,
    pub notifications: Vec<Notification>,
    pub news: Vec<NewsItem>,
    pub challenges: Vec<Challenge>,
    pub cosmetics: Vec<Cosmetic>,
    pub quotes: Vec<Quote>,
    pub battles: Vec<Battle>,
    /// Time of the last bulk load or section refresh.
    pub last_updated: Option<DateTime<Utc>>,
    /// Time each section was last replaced from a server response.
    pub section_updated: BTreeMap<Section, DateTime<Utc>>,
}

impl AppData {
    pub fn stamp(&mut self, section: Section, at: DateTime<Utc>) {
        self.section_updated.insert(section, at);
        self.last_updated = Some(at);
    }
}

/// Load state reported to subscribers next to the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub loading: bool,
    pub error: Option<String>,
}
