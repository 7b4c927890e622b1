// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers and small enums shared between the gateway and the data store.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A named slice of cached domain data.
///
/// Parsing accepts the legacy aliases `chests` and `shop` used by older
/// callers for [`Section::UserChests`] and [`Section::Cosmetics`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    #[strum(to_string = "userInfo")]
    UserInfo,
    #[strum(to_string = "disciplines")]
    Disciplines,
    #[strum(to_string = "userStars")]
    UserStars,
    #[strum(to_string = "userChests", serialize = "chests")]
    UserChests,
    #[strum(to_string = "tribes")]
    Tribes,
    #[strum(to_string = "rankings")]
    Rankings,
    #[strum(to_string = "notifications")]
    Notifications,
    #[strum(to_string = "news")]
    News,
    #[strum(to_string = "challenges")]
    Challenges,
    #[strum(to_string = "cosmetics", serialize = "shop")]
    Cosmetics,
    #[strum(to_string = "quotes")]
    Quotes,
    #[strum(to_string = "battles")]
    Battles,
}

impl Section {
    /// Every section, in bulk-load order.
    pub const ALL: [Section; 12] = [
        Section::UserInfo,
        Section::Disciplines,
        Section::UserStars,
        Section::Tribes,
        Section::UserChests,
        Section::Notifications,
        Section::News,
        Section::Rankings,
        Section::Challenges,
        Section::Cosmetics,
        Section::Quotes,
        Section::Battles,
    ];
}

/// The metric a ranking is ordered by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    Points,
    Stars,
    Xp,
}

impl RankingKind {
    pub const ALL: [RankingKind; 3] = [RankingKind::Points, RankingKind::Stars, RankingKind::Xp];
}

/// Which notifications a read-marker applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTarget {
    /// Every notification that is still unread.
    All,
    /// A single notification by id.
    One(i64),
}

impl NotificationTarget {
    /// Id sent to the backend; `0` means "all".
    pub fn wire_id(self) -> i64 {
        match self {
            NotificationTarget::All => 0,
            NotificationTarget::One(id) => id,
        }
    }
}

impl From<i64> for NotificationTarget {
    fn from(id: i64) -> Self {
        if id == 0 {
            NotificationTarget::All
        } else {
            NotificationTarget::One(id)
        }
    }
}

/// Profile slot a cosmetic can be equipped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CosmeticSlot {
    Avatar,
    Background,
    Frame,
}

impl CosmeticSlot {
    /// Backend `cosmeticTypeId` used when the item itself carries none.
    pub fn default_type_id(self) -> i64 {
        match self {
            CosmeticSlot::Avatar => 1,
            CosmeticSlot::Background => 2,
            CosmeticSlot::Frame => 3,
        }
    }
}

/// Kind of quiz requested from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizRequest {
    /// A learn quiz for one content item at a difficulty.
    Learn { content_id: i64, difficulty: String },
    /// The questions of a challenge.
    Challenge { challenge_id: i64 },
    /// A battle round.
    Battle,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn section_parses_canonical_names_and_aliases() {
        for section in Section::ALL {
            let parsed = Section::from_str(&section.to_string()).expect("round trip");
            assert_eq!(parsed, section);
        }
        assert_eq!(Section::from_str("chests").unwrap(), Section::UserChests);
        assert_eq!(Section::from_str("shop").unwrap(), Section::Cosmetics);
        assert!(Section::from_str("inventory").is_err());
    }

    #[test]
    fn ranking_kind_is_lowercase_on_the_wire() {
        assert_eq!(RankingKind::Xp.to_string(), "xp");
        let json = serde_json::to_string(&RankingKind::Points).unwrap();
        assert_eq!(json, "\"points\"");
    }

    #[test]
    fn notification_target_zero_means_all() {
        assert_eq!(NotificationTarget::from(0), NotificationTarget::All);
        assert_eq!(NotificationTarget::from(7).wire_id(), 7);
        assert_eq!(NotificationTarget::All.wire_id(), 0);
    }
}
