// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical domain types for cached backend data.
//!
//! Every entity keeps unrecognized backend fields in a flattened `extra` map
//! so that the cached shape stays a faithful copy of the server response.
//! Numeric flags (`acquired`, `equipped`, `myTribe`, `me`) stay `0/1`
//! integers because that is what the backend sends and compares against.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend fields this client does not model explicitly.
pub type Extra = serde_json::Map<String, Value>;

/// The signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub initials: Option<String>,
    pub avatar_url: Option<String>,
    pub frame_url: Option<String>,
    pub background_url: Option<String>,
    pub coins: i64,
    pub points: i64,
    pub stars: i64,
    pub level_id: Option<i64>,
    pub team_name: Option<String>,
    pub organization_id: Option<i64>,
    pub organization_name: Option<String>,
    pub organization_url: Option<String>,
    pub groups: Vec<Value>,
    pub tribes: Vec<TribeRef>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub last_login: Option<String>,
    pub created_at: Option<String>,
    pub random_position: Option<i64>,
    pub full_access: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Compact tribe reference embedded in the user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TribeRef {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// An achievement badge with its progress counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Badge {
    pub id: i64,
    pub code: Option<String>,
    pub title: Option<String>,
    pub icon_url: Option<String>,
    pub image_url: Option<String>,
    pub current_level: i64,
    pub current_counter: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload of the user badges endpoint: profile plus badges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub user: Option<User>,
    pub items: Vec<Badge>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A learning area (discipline) with its categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Area {
    pub id: i64,
    pub title: Option<String>,
    pub color: Option<String>,
    pub icon_url: Option<String>,
    pub categories: Vec<Category>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: i64,
    pub title: Option<String>,
    pub color: Option<String>,
    pub icon_url: Option<String>,
    pub contents: Vec<Content>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub id: i64,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Earned vs. attainable stars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarTotals {
    pub earned_stars: i64,
    pub max_stars: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AreaStars {
    pub area_id: i64,
    pub earned_stars: i64,
    pub max_stars: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryStars {
    pub category_id: i64,
    pub earned_stars: i64,
    pub max_stars: i64,
}

/// Stars earned per difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyStars {
    pub easy: i64,
    pub hard: i64,
    pub genius: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentStars {
    pub content_id: i64,
    pub stars: DifficultyStars,
    pub total_stars: i64,
    pub max_stars: i64,
}

/// Payload of the user stars endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStars {
    pub totals: StarTotals,
    pub by_area: Vec<AreaStars>,
    pub by_category: Vec<CategoryStars>,
    pub by_content: Vec<ContentStars>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A tribe the user can belong to. `my_tribe == 1` marks the user's own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tribe {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub my_tribe: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One entrant of a ranking. `me == 1` marks the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingEntry {
    pub user_id: i64,
    pub points: f64,
    pub position: i64,
    pub me: i64,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Ordered ranking for one metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingSnapshot {
    pub ranking: Vec<RankingEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RankingSnapshot {
    /// The signed-in user's entry, if present.
    pub fn me(&self) -> Option<&RankingEntry> {
        self.ranking.iter().find(|entry| entry.me == 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub description: Option<String>,
    pub read_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsItem {
    pub id: i64,
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Challenge {
    pub id: i64,
    pub title: Option<String>,
    pub status: Option<String>,
    pub available_from: Option<String>,
    pub available_until: Option<String>,
    pub user_has_played: i64,
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A shop item (avatar, background or frame).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cosmetic {
    pub id: i64,
    pub name: Option<String>,
    pub cosmetic_type_id: i64,
    pub rarity_type_id: Option<i64>,
    /// Price in coins.
    pub coins: i64,
    pub acquired: i64,
    pub equipped: i64,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Motivational quote shown for a score range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    pub quote: String,
    pub minimum_percentage: f64,
    pub maximum_percentage: f64,
}

/// A single answered question inside a battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerResult {
    pub correct: i64,
    pub time_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Battle {
    pub battle_session_id: i64,
    #[serde(rename = "player1Id")]
    pub player1_id: Option<i64>,
    #[serde(rename = "player2Id")]
    pub player2_id: Option<i64>,
    #[serde(rename = "player1Nickname")]
    pub player1_nickname: Option<String>,
    #[serde(rename = "player2Nickname")]
    pub player2_nickname: Option<String>,
    #[serde(rename = "player1AvatarUrl")]
    pub player1_avatar_url: Option<String>,
    #[serde(rename = "player2AvatarUrl")]
    pub player2_avatar_url: Option<String>,
    #[serde(rename = "player1Tribe")]
    pub player1_tribe: Option<Value>,
    #[serde(rename = "player2Tribe")]
    pub player2_tribe: Option<Value>,
    #[serde(rename = "player1Results")]
    pub player1_results: Vec<AnswerResult>,
    #[serde(rename = "player2Results")]
    pub player2_results: Vec<AnswerResult>,
    pub winner_id: Option<i64>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Organization the user belongs to, taken from the logon user payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationInfo {
    pub id: Option<i64>,
    pub name: String,
    pub logo_url: String,
}

/// Per-user feature flags delivered with the logon user payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    /// `1` shuffles answer positions in quizzes.
    pub random_position: i64,
    /// `1` unlocks battles and challenges.
    pub full_access: i64,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            random_position: 1,
            full_access: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "nickname": "neo",
            "coins": 120,
            "favouriteColor": "green"
        }))
        .unwrap();
        assert_eq!(user.coins, 120);
        assert_eq!(user.extra.get("favouriteColor"), Some(&json!("green")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["favouriteColor"], "green");
        assert_eq!(back["nickname"], "neo");
    }

    #[test]
    fn notification_type_field_maps_to_kind() {
        let n: Notification = serde_json::from_value(json!({
            "id": 1,
            "type": "badge",
            "title": "New badge",
            "readAt": null
        }))
        .unwrap();
        assert_eq!(n.kind.as_deref(), Some("badge"));
        assert!(!n.is_read());
    }

    #[test]
    fn battle_player_fields_use_numbered_names() {
        let b: Battle = serde_json::from_value(json!({
            "battleSessionId": 9,
            "player1Id": 1,
            "player2Id": 2,
            "player1Results": [{"correct": 1, "timeMs": 1500}],
            "winnerId": null,
            "endedAt": null
        }))
        .unwrap();
        assert_eq!(b.player1_id, Some(1));
        assert_eq!(b.player1_results[0].time_ms, 1500);
        assert!(b.ended_at.is_none());
    }

    #[test]
    fn ranking_me_finds_flagged_entry() {
        let snapshot: RankingSnapshot = serde_json::from_value(json!({
            "ranking": [
                {"userId": 1, "points": 50, "position": 1, "me": 0},
                {"userId": 2, "points": 40, "position": 2, "me": 1}
            ]
        }))
        .unwrap();
        assert_eq!(snapshot.me().map(|e| e.user_id), Some(2));
    }

    #[test]
    fn user_config_defaults_to_shuffled_restricted() {
        let config = UserConfig::default();
        assert_eq!(config.random_position, 1);
        assert_eq!(config.full_access, 0);
    }
}
