// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only projections over the cached data.

use std::cmp::Reverse;

use appy_core::model::{
    AnswerResult, Area, Battle, Category, Challenge, Content, Quote, User,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::Value;

/// Headline numbers for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub points: i64,
    pub stars: i64,
    pub coins: i64,
    pub level: i64,
    pub team: String,
    pub organization: String,
    pub groups: Vec<Value>,
    pub tribes: Vec<appy_core::model::TribeRef>,
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        Self {
            points: user.points,
            stars: user.stars,
            coins: user.coins,
            level: user.level_id.unwrap_or(1),
            team: user.team_name.clone().unwrap_or_default(),
            organization: user.organization_name.clone().unwrap_or_default(),
            groups: user.groups.clone(),
            tribes: user.tribes.clone(),
        }
    }
}

/// Display fields of the user profile with empty-string defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub initials: String,
    pub avatar_url: String,
    pub frame_url: String,
    pub background_url: String,
    pub role: String,
    pub status: String,
    pub last_login: Option<String>,
    pub created_at: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            id: user.id,
            first_name: text(&user.first_name),
            last_name: text(&user.last_name),
            nickname: text(&user.nickname),
            email: text(&user.email),
            initials: text(&user.initials),
            avatar_url: text(&user.avatar_url),
            frame_url: text(&user.frame_url),
            background_url: text(&user.background_url),
            role: user.role.clone().unwrap_or_else(|| "student".to_string()),
            status: user.status.clone().unwrap_or_else(|| "active".to_string()),
            last_login: user.last_login.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// A category with its parent area's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCategory {
    pub category: Category,
    pub area_id: i64,
    pub area_title: Option<String>,
    pub area_color: Option<String>,
}

/// A content item with its parent area and category.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatContent {
    pub content: Content,
    pub area_id: i64,
    pub area_title: Option<String>,
    pub area_color: Option<String>,
    pub category_id: i64,
    pub category_title: Option<String>,
    pub category_color: Option<String>,
}

pub fn flatten_categories(areas: &[Area]) -> Vec<FlatCategory> {
    areas
        .iter()
        .flat_map(|area| {
            area.categories.iter().map(move |category| FlatCategory {
                category: category.clone(),
                area_id: area.id,
                area_title: area.title.clone(),
                area_color: area.color.clone(),
            })
        })
        .collect()
}

pub fn flatten_contents(areas: &[Area]) -> Vec<FlatContent> {
    let mut out = Vec::new();
    for area in areas {
        for category in &area.categories {
            for content in &category.contents {
                out.push(FlatContent {
                    content: content.clone(),
                    area_id: area.id,
                    area_title: area.title.clone(),
                    area_color: area.color.clone(),
                    category_id: category.id,
                    category_title: category.title.clone(),
                    category_color: category.color.clone(),
                });
            }
        }
    }
    out
}

/// Where a challenge stands for the user right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChallengeState {
    Available,
    NotStarted,
    /// Expired or already played.
    Closed,
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|t| t.with_timezone(&Utc))
}

pub fn challenge_state(challenge: &Challenge, now: DateTime<Utc>) -> ChallengeState {
    if challenge.user_has_played == 1 {
        return ChallengeState::Closed;
    }
    if parse_time(challenge.available_until.as_deref()).is_some_and(|end| now > end) {
        return ChallengeState::Closed;
    }
    if parse_time(challenge.available_from.as_deref()).is_some_and(|start| now < start) {
        return ChallengeState::NotStarted;
    }
    ChallengeState::Available
}

/// Published challenges, available first, newest id first within a state.
pub fn available_challenges(challenges: &[Challenge], now: DateTime<Utc>) -> Vec<Challenge> {
    let mut published: Vec<Challenge> = challenges
        .iter()
        .filter(|c| c.status.as_deref() == Some("published"))
        .cloned()
        .collect();
    published.sort_by_key(|c| (challenge_state(c, now), Reverse(c.id)));
    published
}

const FALLBACK_QUOTES: [(&str, f64, f64); 3] = [
    ("Fantastic, your effort paid off! 🌈", 80.0, 100.0),
    ("Excellent work, keep it up! ✨", 60.0, 79.0),
    ("Keep practicing, believe in yourself! 💪", 0.0, 59.0),
];

/// Shown when the backend quotes exist but none covers the score.
pub const NO_MATCHING_QUOTE: &str = "Keep learning! 📚";

/// A random quote whose range covers `percentage`.
///
/// Without backend quotes a built-in set is used.
pub fn random_quote(quotes: &[Quote], percentage: f64) -> String {
    let mut rng = rand::thread_rng();
    if quotes.is_empty() {
        let matching: Vec<&str> = FALLBACK_QUOTES
            .iter()
            .filter(|(_, min, max)| percentage >= *min && percentage <= *max)
            .map(|(text, _, _)| *text)
            .collect();
        return matching
            .choose(&mut rng)
            .copied()
            .unwrap_or(FALLBACK_QUOTES[0].0)
            .to_string();
    }

    let matching: Vec<&Quote> = quotes
        .iter()
        .filter(|q| percentage >= q.minimum_percentage && percentage <= q.maximum_percentage)
        .collect();
    matching
        .choose(&mut rng)
        .map(|q| q.quote.clone())
        .unwrap_or_else(|| NO_MATCHING_QUOTE.to_string())
}

/// Correct answers, total answers and time spent by one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub correct: usize,
    pub total: usize,
    pub time_sec: f64,
}

impl PlayerStats {
    fn from_results(results: &[AnswerResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        Some(Self {
            correct: results.iter().filter(|r| r.correct == 1).count(),
            total: results.len(),
            time_sec: results.iter().map(|r| r.time_ms).sum::<i64>() as f64 / 1000.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Pending,
    Win,
    Lose,
}

/// One battle from the signed-in user's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub left: String,
    pub right: String,
    pub left_stats: Option<PlayerStats>,
    pub right_stats: Option<PlayerStats>,
    pub status: BattleOutcome,
    pub battle_session_id: i64,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattleHistory {
    pub pending: Vec<HistoryItem>,
    pub completed: Vec<HistoryItem>,
}

/// Placeholder opponent name while a battle is still open.
pub const UNKNOWN_OPPONENT: &str = "Unknown";

/// Splits the user's battles into pending and completed, newest first.
///
/// Battles the user did not take part in are skipped.
pub fn battle_history(battles: &[Battle], user: &User) -> BattleHistory {
    let mut history = BattleHistory::default();

    for battle in battles {
        let is_player1 = battle.player1_id == Some(user.id);
        let is_player2 = battle.player2_id == Some(user.id);
        if !is_player1 && !is_player2 {
            continue;
        }

        let (mine, theirs, opponent) = if is_player1 {
            (&battle.player1_results, &battle.player2_results, &battle.player2_nickname)
        } else {
            (&battle.player2_results, &battle.player1_results, &battle.player1_nickname)
        };

        let pending = battle.ended_at.is_none();
        let status = match battle.winner_id {
            Some(winner) if !pending && winner == user.id => BattleOutcome::Win,
            Some(_) if !pending => BattleOutcome::Lose,
            _ => BattleOutcome::Pending,
        };
        let right = if pending {
            UNKNOWN_OPPONENT.to_string()
        } else {
            opponent.clone().unwrap_or_else(|| UNKNOWN_OPPONENT.to_string())
        };

        let item = HistoryItem {
            left: user.nickname.clone().unwrap_or_else(|| "You".to_string()),
            right,
            left_stats: PlayerStats::from_results(mine),
            right_stats: PlayerStats::from_results(theirs),
            status,
            battle_session_id: battle.battle_session_id,
            started_at: battle.started_at.clone(),
            ended_at: battle.ended_at.clone(),
        };
        if pending {
            history.pending.push(item);
        } else {
            history.completed.push(item);
        }
    }

    let newest_first =
        |item: &HistoryItem| Reverse(parse_time(item.started_at.as_deref()).unwrap_or_default());
    history.pending.sort_by_key(newest_first);
    history.completed.sort_by_key(newest_first);
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn profile_defaults_role_and_status() {
        let profile = UserProfile::from(&User {
            id: 1,
            nickname: Some("ada".into()),
            ..User::default()
        });
        assert_eq!(profile.role, "student");
        assert_eq!(profile.status, "active");
        assert_eq!(profile.email, "");
        assert_eq!(profile.nickname, "ada");
    }

    #[test]
    fn stats_default_level_is_one() {
        let stats = UserStats::from(&User::default());
        assert_eq!(stats.level, 1);
        assert_eq!(stats.team, "");
    }

    #[test]
    fn challenges_sort_available_then_upcoming_then_closed() {
        let challenges: Vec<Challenge> = serde_json::from_value(json!([
            {"id": 1, "status": "published", "userHasPlayed": 1},
            {"id": 2, "status": "published"},
            {"id": 3, "status": "draft"},
            {"id": 4, "status": "published", "availableFrom": "2026-07-01T00:00:00Z"},
            {"id": 5, "status": "published", "availableUntil": "2026-05-01T00:00:00Z"},
            {"id": 6, "status": "published"}
        ]))
        .unwrap();

        let ids: Vec<i64> = available_challenges(&challenges, now())
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![6, 2, 4, 5, 1]);
    }

    #[test]
    fn quote_picks_from_matching_range() {
        let quotes = vec![
            Quote {
                quote: "high".into(),
                minimum_percentage: 50.0,
                maximum_percentage: 100.0,
            },
            Quote {
                quote: "low".into(),
                minimum_percentage: 0.0,
                maximum_percentage: 49.0,
            },
        ];
        assert_eq!(random_quote(&quotes, 75.0), "high");
        assert_eq!(random_quote(&quotes, 10.0), "low");
        assert_eq!(random_quote(&quotes, 49.5), NO_MATCHING_QUOTE);
    }

    #[test]
    fn quote_falls_back_without_backend_quotes() {
        assert_eq!(random_quote(&[], 90.0), FALLBACK_QUOTES[0].0);
        assert_eq!(random_quote(&[], 65.0), FALLBACK_QUOTES[1].0);
        assert_eq!(random_quote(&[], 120.0), FALLBACK_QUOTES[0].0);
    }

    #[test]
    fn flattening_carries_parent_metadata() {
        let areas: Vec<Area> = serde_json::from_value(json!([{
            "id": 1, "title": "Math", "color": "red",
            "categories": [{"id": 10, "title": "Algebra", "color": "green",
                            "contents": [{"id": 100}, {"id": 101}]}]
        }, {"id": 2, "categories": []}]))
        .unwrap();

        let categories = flatten_categories(&areas);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].area_title.as_deref(), Some("Math"));

        let contents = flatten_contents(&areas);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].content.id, 101);
        assert_eq!(contents[1].category_color.as_deref(), Some("green"));
        assert_eq!(contents[1].area_id, 1);
    }

    #[test]
    fn battle_history_projects_from_the_users_side() {
        let battles: Vec<Battle> = serde_json::from_value(json!([
            {"battleSessionId": 1, "player1Id": 7, "player2Id": 9, "player2Nickname": "bob",
             "player1Results": [{"correct": 1, "timeMs": 1500}, {"correct": 0, "timeMs": 500}],
             "winnerId": 9, "startedAt": "2026-03-01T10:00:00Z", "endedAt": "2026-03-01T10:05:00Z"},
            {"battleSessionId": 2, "player1Id": 9, "player2Id": 7, "player1Nickname": "bob",
             "player2Results": [{"correct": 1, "timeMs": 1000}],
             "winnerId": 7, "startedAt": "2026-03-02T10:00:00Z", "endedAt": "2026-03-02T10:03:00Z"},
            {"battleSessionId": 3, "player1Id": 7, "startedAt": "2026-03-03T10:00:00Z"},
            {"battleSessionId": 4, "player1Id": 1, "player2Id": 2, "endedAt": "2026-03-03T10:00:00Z"}
        ]))
        .unwrap();
        let user = User {
            id: 7,
            nickname: Some("ada".into()),
            ..User::default()
        };

        let history = battle_history(&battles, &user);
        assert_eq!(history.pending.len(), 1);
        assert_eq!(history.pending[0].right, UNKNOWN_OPPONENT);
        assert_eq!(history.pending[0].status, BattleOutcome::Pending);

        let ids: Vec<i64> = history.completed.iter().map(|h| h.battle_session_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(history.completed[0].status, BattleOutcome::Win);
        assert_eq!(history.completed[1].status, BattleOutcome::Lose);
        assert_eq!(history.completed[1].right, "bob");
        assert_eq!(
            history.completed[1].left_stats,
            Some(PlayerStats {
                correct: 1,
                total: 2,
                time_sec: 2.0
            })
        );
        assert_eq!(history.completed[1].right_stats, None);
    }
}
