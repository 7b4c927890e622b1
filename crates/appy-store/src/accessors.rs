// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure read accessors over the current snapshot.
//!
//! Every accessor reads one snapshot and returns owned values, so results
//! stay consistent even if the store changes right after.

use std::sync::Arc;

use appy_core::model::{
    Area, AreaStars, Badge, Battle, Category, CategoryStars, Challenge, Content, ContentStars,
    Cosmetic, NewsItem, Notification, OrganizationInfo, Quote, RankingSnapshot, StarTotals,
    Tribe, User, UserInfo,
};
use appy_core::RankingKind;
use chrono::Utc;
use serde_json::Value;

use crate::store::DataStore;
use crate::views::{self, BattleHistory, FlatCategory, FlatContent, UserProfile, UserStats};

impl DataStore {
    pub fn user_info(&self) -> Option<UserInfo> {
        self.snapshot().user_info.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().user_info.as_ref().and_then(|i| i.user.clone())
    }

    pub fn user_stats(&self) -> Option<UserStats> {
        self.user().as_ref().map(UserStats::from)
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.user().as_ref().map(UserProfile::from)
    }

    pub fn organization_info(&self) -> Option<OrganizationInfo> {
        self.snapshot().organization_info.clone()
    }

    pub fn organization_logo_url(&self) -> Option<String> {
        self.organization_info()
            .map(|o| o.logo_url)
            .filter(|url| !url.is_empty())
    }

    // Badges

    pub fn badges(&self) -> Vec<Badge> {
        self.snapshot()
            .user_info
            .as_ref()
            .map(|i| i.items.clone())
            .unwrap_or_default()
    }

    fn badges_where(&self, keep: impl Fn(&Badge) -> bool) -> Vec<Badge> {
        self.badges().into_iter().filter(|b| keep(b)).collect()
    }

    pub fn badge_by_id(&self, id: i64) -> Option<Badge> {
        self.badges().into_iter().find(|b| b.id == id)
    }

    pub fn badge_by_code(&self, code: &str) -> Option<Badge> {
        self.badges()
            .into_iter()
            .find(|b| b.code.as_deref() == Some(code))
    }

    pub fn completed_badges(&self) -> Vec<Badge> {
        self.badges_where(|b| b.current_level > 0)
    }

    pub fn in_progress_badges(&self) -> Vec<Badge> {
        self.badges_where(|b| b.current_level == 0 && b.current_counter > 0)
    }

    pub fn available_badges(&self) -> Vec<Badge> {
        self.badges_where(|b| b.current_level == 0 && b.current_counter == 0)
    }

    // Disciplines

    pub fn disciplines(&self) -> Vec<Area> {
        self.snapshot().disciplines.clone()
    }

    pub fn area_by_id(&self, area_id: i64) -> Option<Area> {
        self.snapshot()
            .disciplines
            .iter()
            .find(|a| a.id == area_id)
            .cloned()
    }

    pub fn category_by_id(&self, area_id: i64, category_id: i64) -> Option<Category> {
        self.area_by_id(area_id)?
            .categories
            .into_iter()
            .find(|c| c.id == category_id)
    }

    pub fn content_by_id(&self, area_id: i64, category_id: i64, content_id: i64) -> Option<Content> {
        self.category_by_id(area_id, category_id)?
            .contents
            .into_iter()
            .find(|c| c.id == content_id)
    }

    pub fn all_categories(&self) -> Vec<FlatCategory> {
        views::flatten_categories(&self.snapshot().disciplines)
    }

    pub fn all_contents(&self) -> Vec<FlatContent> {
        views::flatten_contents(&self.snapshot().disciplines)
    }

    // Stars; missing entries read as zero.

    pub fn total_stars(&self) -> StarTotals {
        self.snapshot()
            .user_stars
            .as_ref()
            .map(|s| s.totals)
            .unwrap_or_default()
    }

    pub fn area_stars(&self, area_id: i64) -> AreaStars {
        self.snapshot()
            .user_stars
            .as_ref()
            .and_then(|s| s.by_area.iter().find(|a| a.area_id == area_id).cloned())
            .unwrap_or(AreaStars {
                area_id,
                ..AreaStars::default()
            })
    }

    pub fn category_stars(&self, category_id: i64) -> CategoryStars {
        self.snapshot()
            .user_stars
            .as_ref()
            .and_then(|s| s.by_category.iter().find(|c| c.category_id == category_id).cloned())
            .unwrap_or(CategoryStars {
                category_id,
                ..CategoryStars::default()
            })
    }

    pub fn content_stars(&self, content_id: i64) -> ContentStars {
        self.snapshot()
            .user_stars
            .as_ref()
            .and_then(|s| s.by_content.iter().find(|c| c.content_id == content_id).cloned())
            .unwrap_or(ContentStars {
                content_id,
                ..ContentStars::default()
            })
    }

    pub fn user_chests(&self) -> Option<Value> {
        self.snapshot().user_chests.clone()
    }

    // Tribes

    pub fn tribes(&self) -> Vec<Tribe> {
        self.snapshot().tribes.clone()
    }

    pub fn user_tribe(&self) -> Option<Tribe> {
        self.snapshot().tribes.iter().find(|t| t.my_tribe == 1).cloned()
    }

    pub fn available_tribes(&self) -> Vec<Tribe> {
        self.snapshot()
            .tribes
            .iter()
            .filter(|t| t.my_tribe == 0)
            .cloned()
            .collect()
    }

    pub fn tribe_by_id(&self, tribe_id: i64) -> Option<Tribe> {
        self.snapshot().tribes.iter().find(|t| t.id == tribe_id).cloned()
    }

    pub fn is_in_tribe(&self) -> bool {
        self.user_tribe().is_some()
    }

    pub fn rankings(&self, kind: RankingKind) -> Option<Arc<RankingSnapshot>> {
        self.snapshot().rankings.get(kind).cloned()
    }

    // Notifications and news

    pub fn notifications(&self) -> Vec<Notification> {
        self.snapshot().notifications.clone()
    }

    /// Unread first; order within each group is kept.
    pub fn sorted_notifications(&self) -> Vec<Notification> {
        let mut list = self.notifications();
        list.sort_by_key(Notification::is_read);
        list
    }

    pub fn unread_notifications_count(&self) -> usize {
        self.snapshot()
            .notifications
            .iter()
            .filter(|n| !n.is_read())
            .count()
    }

    pub fn news(&self) -> Vec<NewsItem> {
        self.snapshot().news.clone()
    }

    // Challenges

    pub fn challenges(&self) -> Vec<Challenge> {
        self.snapshot().challenges.clone()
    }

    pub fn challenge_by_id(&self, challenge_id: i64) -> Option<Challenge> {
        self.snapshot()
            .challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .cloned()
    }

    pub fn available_challenges(&self) -> Vec<Challenge> {
        views::available_challenges(&self.snapshot().challenges, Utc::now())
    }

    // Cosmetics

    pub fn cosmetics(&self) -> Vec<Cosmetic> {
        self.snapshot().cosmetics.clone()
    }

    fn cosmetics_where(&self, keep: impl Fn(&Cosmetic) -> bool) -> Vec<Cosmetic> {
        self.snapshot()
            .cosmetics
            .iter()
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }

    pub fn cosmetic_by_id(&self, cosmetic_id: i64) -> Option<Cosmetic> {
        self.snapshot()
            .cosmetics
            .iter()
            .find(|c| c.id == cosmetic_id)
            .cloned()
    }

    pub fn cosmetics_by_type(&self, type_id: i64) -> Vec<Cosmetic> {
        self.cosmetics_where(|c| c.cosmetic_type_id == type_id)
    }

    pub fn acquired_cosmetics_by_type(&self, type_id: i64) -> Vec<Cosmetic> {
        self.cosmetics_where(|c| c.cosmetic_type_id == type_id && c.acquired == 1)
    }

    pub fn cosmetics_by_rarity(&self, rarity_id: i64) -> Vec<Cosmetic> {
        self.cosmetics_where(|c| c.rarity_type_id == Some(rarity_id))
    }

    pub fn acquired_cosmetics(&self) -> Vec<Cosmetic> {
        self.cosmetics_where(|c| c.acquired == 1)
    }

    // Quotes and battles

    pub fn quotes(&self) -> Vec<Quote> {
        self.snapshot().quotes.clone()
    }

    pub fn random_quote_by_percentage(&self, percentage: f64) -> String {
        views::random_quote(&self.snapshot().quotes, percentage)
    }

    pub fn battles(&self) -> Vec<Battle> {
        self.snapshot().battles.clone()
    }

    pub fn battle_by_id(&self, battle_session_id: i64) -> Option<Battle> {
        self.snapshot()
            .battles
            .iter()
            .find(|b| b.battle_session_id == battle_session_id)
            .cloned()
    }

    /// Empty when no user is cached.
    pub fn battle_history(&self) -> BattleHistory {
        let data = self.snapshot();
        match data.user_info.as_ref().and_then(|i| i.user.as_ref()) {
            Some(user) => views::battle_history(&data.battles, user),
            None => BattleHistory::default(),
        }
    }
}
