// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope normalization.
//!
//! The backend wraps list payloads in a keyed envelope (`{areas: [...]}`,
//! `{challenges: [...]}`, `{items: [...]}`) but older endpoints answer with a
//! bare array. Both shapes normalize to the same typed list here.

use std::collections::HashMap;

use appy_core::model::{
    Area, Battle, Challenge, Cosmetic, NewsItem, Notification, Quote, RankingSnapshot, Tribe,
    UserInfo, UserStars,
};
use appy_core::{AppyError, Section};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A section payload in its canonical shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    UserInfo(UserInfo),
    Disciplines(Vec<Area>),
    UserStars(UserStars),
    UserChests(Value),
    Tribes(Vec<Tribe>),
    Notifications(Vec<Notification>),
    News(Vec<NewsItem>),
    Challenges(Vec<Challenge>),
    Cosmetics(Vec<Cosmetic>),
    Quotes(Vec<Quote>),
    Battles(Vec<Battle>),
}

/// Envelope key of a list section.
pub fn envelope_key(section: Section) -> Option<&'static str> {
    match section {
        Section::Disciplines => Some("areas"),
        Section::Tribes => Some("tribes"),
        Section::Notifications => Some("notifications"),
        Section::News => Some("news"),
        Section::Challenges => Some("challenges"),
        Section::Cosmetics | Section::Quotes => Some("items"),
        Section::Battles => Some("battles"),
        _ => None,
    }
}

/// Unwraps `key` from an envelope, or accepts a bare array.
///
/// A missing or `null` list is empty.
pub fn list<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>, AppyError> {
    let items = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(items) => items,
        },
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(AppyError::Decode {
                message: format!("expected a `{key}` list, got {other}"),
                source: None,
            });
        }
    };
    serde_json::from_value(items).map_err(|e| AppyError::decode(key, e))
}

fn object<T: DeserializeOwned + Default>(body: Value, context: &str) -> Result<T, AppyError> {
    if body.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(body).map_err(|e| AppyError::decode(context, e))
}

/// Normalizes a raw section response.
pub fn section(section: Section, body: Value) -> Result<SectionPayload, AppyError> {
    let key = envelope_key(section).unwrap_or_default();
    Ok(match section {
        Section::UserInfo => SectionPayload::UserInfo(object(body, "userInfo")?),
        Section::UserStars => SectionPayload::UserStars(object(body, "userStars")?),
        Section::UserChests => SectionPayload::UserChests(body),
        Section::Disciplines => SectionPayload::Disciplines(list(body, key)?),
        Section::Tribes => SectionPayload::Tribes(list(body, key)?),
        Section::Notifications => SectionPayload::Notifications(list(body, key)?),
        Section::News => SectionPayload::News(list(body, key)?),
        Section::Challenges => SectionPayload::Challenges(list(body, key)?),
        Section::Cosmetics => SectionPayload::Cosmetics(list(body, key)?),
        Section::Quotes => SectionPayload::Quotes(list(body, key)?),
        Section::Battles => SectionPayload::Battles(list(body, key)?),
        Section::Rankings => return Err(AppyError::UnknownSection(section.to_string())),
    })
}

pub fn ranking(body: Value) -> Result<RankingSnapshot, AppyError> {
    object(body, "ranking")
}

/// Applies the local read state to an incoming notification list.
///
/// A server item that is still unread takes the `readAt` the client
/// recorded for it; anything the server already marked read is kept as sent.
pub fn merge_notifications(local: &[Notification], incoming: Vec<Notification>) -> Vec<Notification> {
    let read: HashMap<i64, &String> = local
        .iter()
        .filter_map(|n| n.read_at.as_ref().map(|at| (n.id, at)))
        .collect();

    incoming
        .into_iter()
        .map(|mut n| {
            if n.read_at.is_none()
                && let Some(at) = read.get(&n.id)
            {
                n.read_at = Some((*at).clone());
            }
            n
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_accepts_envelope_bare_array_and_missing_key() {
        let wrapped: Vec<Area> =
            list(json!({"success": true, "areas": [{"id": 1}]}), "areas").unwrap();
        assert_eq!(wrapped[0].id, 1);

        let bare: Vec<Area> = list(json!([{"id": 2}]), "areas").unwrap();
        assert_eq!(bare[0].id, 2);

        let missing: Vec<Area> = list(json!({"success": true}), "areas").unwrap();
        assert!(missing.is_empty());

        let null: Vec<Area> = list(json!({"areas": null}), "areas").unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn list_rejects_scalars() {
        let err = list::<Area>(json!("nope"), "areas").unwrap_err();
        assert!(matches!(err, AppyError::Decode { .. }));
    }

    #[test]
    fn section_uses_the_right_envelope_key() {
        let payload = section(
            Section::Cosmetics,
            json!({"items": [{"id": 5, "coins": 10}]}),
        )
        .unwrap();
        match payload {
            SectionPayload::Cosmetics(items) => assert_eq!(items[0].coins, 10),
            other => panic!("unexpected payload {other:?}"),
        }

        let payload = section(Section::Battles, json!({"battles": [{"battleSessionId": 3}]}))
            .unwrap();
        assert_eq!(
            payload,
            SectionPayload::Battles(vec![Battle {
                battle_session_id: 3,
                ..Battle::default()
            }])
        );
    }

    #[test]
    fn rankings_is_not_a_plain_section() {
        assert!(matches!(
            section(Section::Rankings, json!({})),
            Err(AppyError::UnknownSection(_))
        ));
    }

    #[test]
    fn merge_keeps_local_read_at_for_unread_server_items() {
        let local = vec![
            Notification {
                id: 1,
                read_at: Some("2026-05-01T10:00:00Z".into()),
                ..Default::default()
            },
            Notification {
                id: 2,
                ..Default::default()
            },
        ];
        let incoming = vec![
            Notification {
                id: 1,
                ..Default::default()
            },
            Notification {
                id: 2,
                ..Default::default()
            },
            Notification {
                id: 3,
                read_at: Some("2026-05-02T00:00:00Z".into()),
                ..Default::default()
            },
        ];

        let merged = merge_notifications(&local, incoming);
        assert_eq!(merged[0].read_at.as_deref(), Some("2026-05-01T10:00:00Z"));
        assert_eq!(merged[1].read_at, None);
        assert_eq!(merged[2].read_at.as_deref(), Some("2026-05-02T00:00:00Z"));
    }

    #[test]
    fn merge_prefers_server_read_at_when_present() {
        let local = vec![Notification {
            id: 1,
            read_at: Some("local".into()),
            ..Default::default()
        }];
        let incoming = vec![Notification {
            id: 1,
            read_at: Some("server".into()),
            ..Default::default()
        }];
        assert_eq!(
            merge_notifications(&local, incoming)[0].read_at.as_deref(),
            Some("server")
        );
    }
}
