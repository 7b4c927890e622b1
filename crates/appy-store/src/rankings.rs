// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking change detection.

use appy_core::model::{RankingEntry, RankingSnapshot};

/// Entrants compared position by position from the top.
pub const TOP_ENTRANTS: usize = 5;

fn same_standing(a: &RankingEntry, b: &RankingEntry) -> bool {
    a.position == b.position && a.points == b.points
}

/// True when `fresh` differs from `cached` in a way the UI would show.
///
/// Compares the entrant count, then identity, score and position of the
/// top entrants, then the signed-in user's position and score. Entrants
/// below the top who are not the user are ignored.
pub fn has_changed(cached: &RankingSnapshot, fresh: &RankingSnapshot) -> bool {
    if cached.ranking.len() != fresh.ranking.len() {
        return true;
    }

    let top_changed = cached
        .ranking
        .iter()
        .zip(&fresh.ranking)
        .take(TOP_ENTRANTS)
        .any(|(old, new)| old.user_id != new.user_id || !same_standing(old, new));
    if top_changed {
        return true;
    }

    match (cached.me(), fresh.me()) {
        (Some(old), Some(new)) => old.user_id != new.user_id || !same_standing(old, new),
        _ => false,
    }
}
