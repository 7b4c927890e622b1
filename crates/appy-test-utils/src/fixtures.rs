// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned backend payloads, shaped like the real envelopes.

use serde_json::{json, Value};

use appy_core::{RankingKind, Section};

use crate::mock_backend::{MockBackend, Route};

/// Id of the user every fixture is built around.
pub const USER_ID: i64 = 42;

pub fn user_info(coins: i64) -> Value {
    json!({
        "success": true,
        "user": {
            "id": USER_ID,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "nickname": "ada",
            "email": "ada@example.com",
            "initials": "AL",
            "avatarUrl": "https://cdn.example.com/avatars/owl.png",
            "frameUrl": "https://cdn.example.com/frames/gold.png",
            "backgroundUrl": "assets/backgrounds/default.png",
            "coins": coins,
            "points": 250,
            "stars": 12,
            "levelId": 3,
            "teamName": "Blue",
            "organizationId": 7,
            "organizationName": "Lovelace Academy",
            "organizationUrl": "https://cdn.example.com/org/logo.png",
            "tribes": []
        },
        "items": [
            {"id": 1, "code": "FIRST_QUIZ", "title": "First quiz", "currentLevel": 1, "currentCounter": 1,
             "imageUrl": "https://cdn.example.com/badges/first.png"},
            {"id": 2, "code": "STREAK", "title": "Streak", "currentLevel": 0, "currentCounter": 3},
            {"id": 3, "code": "GENIUS", "title": "Genius", "currentLevel": 0, "currentCounter": 0}
        ]
    })
}

pub fn disciplines() -> Value {
    json!({
        "success": true,
        "areas": [
            {
                "id": 1, "title": "Mathematics", "color": "#ff0000",
                "iconUrl": "https://cdn.example.com/areas/math.png",
                "categories": [
                    {
                        "id": 10, "title": "Algebra", "color": "#00ff00",
                        "contents": [
                            {"id": 100, "title": "Equations",
                             "imageUrl": "https://cdn.example.com/contents/eq.png",
                             "thumbnailUrl": "https://cdn.example.com/contents/eq_t.png"},
                            {"id": 101, "title": "Inequalities"}
                        ]
                    },
                    {"id": 11, "title": "Geometry", "color": "#0000ff", "contents": []}
                ]
            },
            {"id": 2, "title": "History", "color": "#333333", "categories": []}
        ]
    })
}

pub fn user_stars() -> Value {
    json!({
        "success": true,
        "totals": {"earnedStars": 12, "maxStars": 90},
        "byArea": [{"areaId": 1, "earnedStars": 10, "maxStars": 60}],
        "byCategory": [{"categoryId": 10, "earnedStars": 7, "maxStars": 30}],
        "byContent": [{"contentId": 100, "stars": {"easy": 1, "hard": 1, "genius": 0},
                       "totalStars": 2, "maxStars": 3}]
    })
}

pub fn tribes() -> Value {
    json!({
        "success": true,
        "tribes": [
            {"id": 1, "name": "Owls", "color": "#111111", "icon": "owl", "myTribe": 0},
            {"id": 2, "name": "Foxes", "color": "#222222", "icon": "fox", "myTribe": 1},
            {"id": 3, "name": "Bears", "color": "#333333", "icon": "bear", "myTribe": 0}
        ]
    })
}

/// Notifications envelope from `(id, readAt)` pairs.
pub fn notifications(items: &[(i64, Option<&str>)]) -> Value {
    let list: Vec<Value> = items
        .iter()
        .map(|(id, read_at)| {
            json!({
                "id": id,
                "type": "info",
                "title": format!("Notification {id}"),
                "readAt": read_at
            })
        })
        .collect();
    json!({ "success": true, "notifications": list })
}

pub fn news(ids: &[i64]) -> Value {
    let list: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "title": format!("News {id}") }))
        .collect();
    json!({ "success": true, "news": list })
}

/// Ranking envelope from `(userId, points, position, me)` tuples.
pub fn ranking(entries: &[(i64, f64, i64, i64)]) -> Value {
    let list: Vec<Value> = entries
        .iter()
        .map(|(user_id, points, position, me)| {
            json!({
                "userId": user_id,
                "points": points,
                "position": position,
                "me": me,
                "nickname": format!("user{user_id}")
            })
        })
        .collect();
    json!({ "success": true, "ranking": list })
}

/// A ranking of six entrants with the fixture user in fifth place.
pub fn default_ranking() -> Value {
    ranking(&[
        (1, 900.0, 1, 0),
        (2, 800.0, 2, 0),
        (3, 700.0, 3, 0),
        (4, 600.0, 4, 0),
        (USER_ID, 250.0, 5, 1),
        (6, 100.0, 6, 0),
    ])
}

pub fn cosmetics() -> Value {
    json!({
        "success": true,
        "items": [
            {"id": 1, "name": "Owl", "cosmeticTypeId": 1, "rarityTypeId": 1, "coins": 30,
             "acquired": 0, "equipped": 0, "imageUrl": "https://cdn.example.com/shop/owl.png"},
            {"id": 2, "name": "Fox", "cosmeticTypeId": 1, "rarityTypeId": 2, "coins": 50,
             "acquired": 1, "equipped": 1, "imageUrl": "https://cdn.example.com/shop/fox.png"},
            {"id": 3, "name": "Sky", "cosmeticTypeId": 2, "rarityTypeId": 1, "coins": 20,
             "acquired": 1, "equipped": 0, "imageUrl": "https://cdn.example.com/shop/sky.png"},
            {"id": 4, "name": "Gold", "cosmeticTypeId": 3, "rarityTypeId": 3, "coins": 500,
             "acquired": 0, "equipped": 0, "imageUrl": "https://cdn.example.com/shop/gold.png"}
        ]
    })
}

pub fn challenges() -> Value {
    json!({
        "success": true,
        "challenges": [
            {"id": 1, "title": "Played", "status": "published", "userHasPlayed": 1},
            {"id": 2, "title": "Open", "status": "published", "userHasPlayed": 0},
            {"id": 3, "title": "Draft", "status": "draft", "userHasPlayed": 0},
            {"id": 4, "title": "Future", "status": "published", "userHasPlayed": 0,
             "availableFrom": "2999-01-01T00:00:00Z"},
            {"id": 5, "title": "Expired", "status": "published", "userHasPlayed": 0,
             "availableUntil": "2000-01-01T00:00:00Z"},
            {"id": 6, "title": "Newest open", "status": "published", "userHasPlayed": 0,
             "imageUrl": "https://cdn.example.com/challenges/6.png"}
        ]
    })
}

pub fn quotes() -> Value {
    json!({
        "success": true,
        "items": [
            {"quote": "Top marks!", "minimumPercentage": 90, "maximumPercentage": 100},
            {"quote": "Keep going", "minimumPercentage": 0, "maximumPercentage": 89}
        ]
    })
}

pub fn battles() -> Value {
    json!({
        "success": true,
        "battles": [
            {
                "battleSessionId": 1, "player1Id": USER_ID, "player2Id": 9,
                "player1Nickname": "ada", "player2Nickname": "bob",
                "player1Results": [{"correct": 1, "timeMs": 1500}, {"correct": 0, "timeMs": 2500}],
                "player2Results": [{"correct": 1, "timeMs": 1000}, {"correct": 1, "timeMs": 1000}],
                "winnerId": 9, "startedAt": "2026-03-01T10:00:00Z", "endedAt": "2026-03-01T10:05:00Z"
            },
            {
                "battleSessionId": 2, "player1Id": 9, "player2Id": USER_ID,
                "player1Nickname": "bob", "player2Nickname": "ada",
                "player1Results": [{"correct": 0, "timeMs": 3000}],
                "player2Results": [{"correct": 1, "timeMs": 1000}],
                "winnerId": USER_ID, "startedAt": "2026-03-02T10:00:00Z", "endedAt": "2026-03-02T10:03:00Z"
            },
            {
                "battleSessionId": 3, "player1Id": USER_ID, "player2Id": null,
                "player1Results": [{"correct": 1, "timeMs": 2000}],
                "player2Results": [],
                "winnerId": null, "startedAt": "2026-03-03T10:00:00Z", "endedAt": null
            },
            {
                "battleSessionId": 4, "player1Id": 8, "player2Id": 9,
                "winnerId": 8, "startedAt": "2026-03-04T10:00:00Z", "endedAt": "2026-03-04T10:01:00Z"
            }
        ]
    })
}

pub fn logon_user() -> Value {
    json!({
        "success": true,
        "user": {
            "id": USER_ID,
            "nickname": "ada",
            "organizationId": 7,
            "organizationName": "Lovelace Academy",
            "organizationUrl": "https://cdn.example.com/org/logo.png",
            "randomPosition": 0,
            "fullAccess": 1
        }
    })
}

/// A backend with every section and ranking scripted.
pub fn scripted_backend(coins: i64) -> MockBackend {
    let backend = MockBackend::new();
    backend
        .respond(Route::Section(Section::UserInfo), user_info(coins))
        .respond(Route::Section(Section::Disciplines), disciplines())
        .respond(Route::Section(Section::UserStars), user_stars())
        .respond(
            Route::Section(Section::UserChests),
            json!({"success": true, "chests": [{"id": 1, "opened": 0}]}),
        )
        .respond(Route::Section(Section::Tribes), tribes())
        .respond(
            Route::Section(Section::Notifications),
            notifications(&[(1, None), (2, Some("2026-01-01T00:00:00Z"))]),
        )
        .respond(Route::Section(Section::News), news(&[1, 2]))
        .respond(Route::Section(Section::Challenges), challenges())
        .respond(Route::Section(Section::Cosmetics), cosmetics())
        .respond(Route::Section(Section::Quotes), quotes())
        .respond(Route::Section(Section::Battles), battles())
        .respond(Route::LogonUser, logon_user());
    for kind in RankingKind::ALL {
        backend.respond(Route::Rankings(kind), default_ranking());
    }
    backend
}
