// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data store behavior against a scripted backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use appy_core::{AppyError, NotificationTarget, RankingKind, Section};
use appy_store::{AppData, DataStore, EquipSelection, Subscription};
use appy_test_utils::fixtures::{self, USER_ID};
use appy_test_utils::{MockBackend, Route};
use serde_json::json;
use tracing_test::traced_test;

type Seen = Arc<Mutex<Vec<(bool, Option<String>)>>>;

fn store_with(backend: MockBackend) -> (DataStore, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    (DataStore::with_defaults(backend.clone()), backend)
}

async fn loaded(coins: i64) -> (DataStore, Arc<MockBackend>) {
    let (store, backend) = store_with(fixtures::scripted_backend(coins));
    store.load_app_data().await.unwrap();
    (store, backend)
}

fn record(store: &DataStore) -> (Subscription, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store.subscribe(move |_: &Arc<AppData>, loading, error| {
        sink.lock()
            .unwrap()
            .push((loading, error.map(str::to_string)));
    });
    (sub, seen)
}

fn coins(store: &DataStore) -> i64 {
    store.user().unwrap().coins
}

// --- bulk load ---

#[tokio::test]
async fn bulk_load_populates_every_section_with_one_final_notification() {
    let (store, backend) = store_with(fixtures::scripted_backend(100));
    let (_sub, seen) = record(&store);

    let report = store.load_app_data().await.unwrap();
    assert!(report.is_complete());

    let notes = seen.lock().unwrap().clone();
    assert_eq!(notes, vec![(true, None), (false, None)]);

    let data = store.snapshot();
    assert_eq!(store.user().unwrap().id, USER_ID);
    assert_eq!(coins(&store), 100);
    assert_eq!(data.disciplines.len(), 2);
    assert_eq!(data.tribes.len(), 3);
    assert_eq!(data.notifications.len(), 2);
    assert_eq!(data.news.len(), 2);
    assert_eq!(data.challenges.len(), 6);
    assert_eq!(data.cosmetics.len(), 4);
    assert_eq!(data.quotes.len(), 2);
    assert_eq!(data.battles.len(), 4);
    assert!(data.user_stars.is_some());
    assert!(data.user_chests.is_some());
    for kind in RankingKind::ALL {
        assert!(data.rankings.get(kind).is_some());
    }
    assert!(data.last_updated.is_some());
    assert!(data.section_updated.contains_key(&Section::Rankings));

    // Sections are fetched one at a time, in a fixed order.
    let log = backend.call_log();
    assert_eq!(log.first(), Some(&Route::Section(Section::UserInfo)));
    assert_eq!(log.last(), Some(&Route::Section(Section::Battles)));
    assert_eq!(log.len(), 11 + 3);
}

#[tokio::test]
#[traced_test]
async fn bulk_load_isolates_failing_sections() {
    let backend = fixtures::scripted_backend(100);
    backend
        .fail(Route::Section(Section::Tribes), 500)
        .fail_network(Route::Section(Section::Cosmetics))
        .fail(Route::Rankings(RankingKind::Xp), 502);
    let (store, _backend) = store_with(backend);

    let report = store.load_app_data().await.unwrap();
    assert_eq!(
        report.failed_sections,
        vec![Section::Tribes, Section::Cosmetics]
    );
    assert_eq!(report.failed_rankings, vec![RankingKind::Xp]);

    let data = store.snapshot();
    assert!(data.tribes.is_empty());
    assert!(data.cosmetics.is_empty());
    assert!(data.rankings.get(RankingKind::Xp).is_none());
    assert!(data.rankings.get(RankingKind::Points).is_some());
    assert_eq!(data.disciplines.len(), 2);
    assert_eq!(store.status().error, None);
    assert!(!data.section_updated.contains_key(&Section::Tribes));
    assert!(logs_contain("section failed to load"));
}

#[tokio::test]
async fn bulk_load_fails_only_when_everything_fails() {
    let backend = MockBackend::new();
    for section in Section::ALL {
        backend.fail(Route::Section(section), 503);
    }
    for kind in RankingKind::ALL {
        backend.fail(Route::Rankings(kind), 503);
    }
    let (store, _backend) = store_with(backend);
    let (_sub, seen) = record(&store);

    let err = store.load_app_data().await.unwrap_err();
    assert!(matches!(err, AppyError::RequestFailed { status: 503, .. }));
    assert!(store.status().error.is_some());
    assert!(!store.status().loading);

    let notes = seen.lock().unwrap().clone();
    assert_eq!(notes.len(), 2);
    assert!(notes[1].1.is_some());
}

#[tokio::test]
async fn bulk_load_keeps_local_read_state() {
    let (store, backend) = loaded(100).await;
    store.mark_notification_as_read(1).await.unwrap();
    let local = store.notifications()[0].read_at.clone();
    assert!(local.is_some());

    store.load_app_data().await.unwrap();
    assert_eq!(store.notifications()[0].read_at, local);
    assert_eq!(backend.arguments(Route::MarkRead), vec![1]);
}

// --- section refresh ---

#[tokio::test]
async fn refresh_section_normalizes_and_notifies() {
    let (store, backend) = loaded(100).await;
    backend.respond(
        Route::Section(Section::Challenges),
        json!([{"id": 77, "status": "published"}]),
    );
    let (_sub, seen) = record(&store);

    let data = store.refresh_section(Section::Challenges).await.unwrap();
    assert_eq!(data.challenges.len(), 1);
    assert_eq!(data.challenges[0].id, 77);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn refresh_section_accepts_legacy_names() {
    let (store, _backend) = loaded(100).await;
    let section: Section = "shop".parse().unwrap();
    let data = store.refresh_section(section).await.unwrap();
    assert_eq!(data.cosmetics.len(), 4);
}

#[tokio::test]
async fn refresh_section_errors_propagate_without_notifying() {
    let (store, backend) = loaded(100).await;
    backend.fail(Route::Section(Section::News), 500);
    let (_sub, seen) = record(&store);

    let err = store.refresh_section(Section::News).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(store.news().len(), 2);
    assert!(seen.lock().unwrap().is_empty());

    assert!(matches!(
        store.refresh_section(Section::Rankings).await,
        Err(AppyError::UnknownSection(_))
    ));
}

// --- notifications ---

#[tokio::test]
async fn notification_refresh_keeps_local_read_at() {
    let (store, _backend) = loaded(100).await;
    store.mark_notification_as_read(1).await.unwrap();
    let local = store.notifications()[0].read_at.clone().unwrap();

    // The server has not caught up yet and still reports id 1 unread.
    store.refresh_section(Section::Notifications).await.unwrap();
    let n = store.notifications();
    assert_eq!(n[0].read_at.as_deref(), Some(local.as_str()));
    assert_eq!(n[1].read_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    assert_eq!(store.unread_notifications_count(), 0);
}

#[tokio::test]
async fn mark_read_rolls_back_on_failure() {
    let (store, backend) = loaded(100).await;
    backend.fail(Route::MarkRead, 500);
    let (_sub, seen) = record(&store);

    let err = store.mark_notification_as_read(1).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(store.notifications()[0].read_at, None);
    assert_eq!(store.unread_notifications_count(), 1);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn mark_all_read_touches_only_unread_items() {
    let (store, backend) = loaded(100).await;
    store
        .mark_notification_as_read(NotificationTarget::All)
        .await
        .unwrap();

    let n = store.notifications();
    assert!(n.iter().all(|n| n.is_read()));
    assert_eq!(n[1].read_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    assert_eq!(backend.arguments(Route::MarkRead), vec![0]);
}

#[tokio::test]
async fn sorted_notifications_put_unread_first() {
    let backend = fixtures::scripted_backend(100);
    backend.respond(
        Route::Section(Section::Notifications),
        fixtures::notifications(&[(1, Some("x")), (2, None), (3, Some("y")), (4, None)]),
    );
    let (store, _backend) = store_with(backend);
    store.load_app_data().await.unwrap();

    let ids: Vec<i64> = store.sorted_notifications().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![2, 4, 1, 3]);
}

#[tokio::test]
async fn load_notifications_diffs_by_id() {
    let (store, backend) = loaded(100).await;
    let (_sub, seen) = record(&store);

    let unchanged = store.load_notifications().await.unwrap();
    assert!(!unchanged.has_changes);
    assert!(seen.lock().unwrap().is_empty());

    backend.respond(
        Route::Section(Section::Notifications),
        fixtures::notifications(&[(5, None), (1, None), (2, None)]),
    );
    let changed = store.load_notifications().await.unwrap();
    assert!(changed.has_changes);
    assert_eq!(changed.new_items, vec![5]);
    assert_eq!(store.notifications().len(), 3);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn load_news_diffs_by_id() {
    let (store, backend) = loaded(100).await;

    assert!(!store.load_news().await.unwrap().has_changes);

    backend.respond(Route::Section(Section::News), fixtures::news(&[1, 2, 3]));
    let changes = store.load_news().await.unwrap();
    assert!(changes.has_changes);
    assert_eq!(changes.new_items, vec![3]);
    assert_eq!(store.news().len(), 3);

    assert!(!store.load_news().await.unwrap().has_changes);
}

// --- rankings ---

#[tokio::test]
async fn ranking_gate_keeps_cache_when_nothing_changed() {
    let (store, backend) = loaded(100).await;
    let before = store.rankings(RankingKind::Points).unwrap();

    // Only an entrant outside the top five changes its nickname.
    let mut quiet = fixtures::default_ranking();
    quiet["ranking"][5]["nickname"] = json!("renamed");
    backend.respond(Route::Rankings(RankingKind::Points), quiet);

    let (_sub, seen) = record(&store);
    let changed = store.check_and_update_rankings().await.unwrap();

    assert!(!changed);
    assert!(seen.lock().unwrap().is_empty());
    assert!(Arc::ptr_eq(
        &before,
        &store.rankings(RankingKind::Points).unwrap()
    ));
}

#[tokio::test]
async fn ranking_gate_replaces_changed_metric_only() {
    let (store, backend) = loaded(100).await;
    let stars_before = store.rankings(RankingKind::Stars).unwrap();

    let mut moved = fixtures::default_ranking();
    moved["ranking"][4]["points"] = json!(275.0);
    backend.respond(Route::Rankings(RankingKind::Points), moved);

    let (_sub, seen) = record(&store);
    assert!(store.check_and_update_rankings().await.unwrap());
    assert_eq!(seen.lock().unwrap().len(), 1);

    let points = store.rankings(RankingKind::Points).unwrap();
    assert_eq!(points.me().unwrap().points, 275.0);
    assert!(Arc::ptr_eq(
        &stars_before,
        &store.rankings(RankingKind::Stars).unwrap()
    ));
}

#[tokio::test]
async fn ranking_gate_fetches_missing_metrics() {
    let backend = fixtures::scripted_backend(100);
    backend.fail_once(Route::Rankings(RankingKind::Xp), 500);
    let (store, backend) = store_with(backend);
    store.load_app_data().await.unwrap();
    assert!(store.rankings(RankingKind::Xp).is_none());

    assert!(store.check_and_update_rankings().await.unwrap());
    assert!(store.rankings(RankingKind::Xp).is_some());
    assert_eq!(backend.calls(Route::Rankings(RankingKind::Xp)), 2);
}

#[tokio::test]
async fn ranking_gate_error_on_cached_metric_applies_nothing() {
    let (store, backend) = loaded(100).await;
    let mut moved = fixtures::default_ranking();
    moved["ranking"][0]["points"] = json!(999.0);
    backend
        .respond(Route::Rankings(RankingKind::Points), moved)
        .fail(Route::Rankings(RankingKind::Xp), 500);
    let before = store.rankings(RankingKind::Points).unwrap();

    assert!(store.check_and_update_rankings().await.is_err());
    assert!(Arc::ptr_eq(
        &before,
        &store.rankings(RankingKind::Points).unwrap()
    ));
}

#[tokio::test]
async fn refresh_rankings_replaces_unconditionally() {
    let (store, _backend) = loaded(100).await;
    let before = store.rankings(RankingKind::Points).unwrap();
    let after = store.refresh_rankings(RankingKind::Points).await.unwrap();
    assert_eq!(*before, *after);
    assert!(!Arc::ptr_eq(&before, &after));
}

// --- purchases ---

#[tokio::test]
async fn purchase_rolls_back_when_backend_rejects() {
    let (store, backend) = loaded(100).await;
    backend
        .fail(Route::Purchase, 500)
        .delay(Route::Purchase, Duration::from_millis(50));
    let (_sub, seen) = record(&store);

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    assert_eq!(receipt.new_coins, 70);
    assert_eq!(receipt.cosmetic.acquired, 1);
    assert_eq!(coins(&store), 70);
    assert_eq!(store.cosmetic_by_id(1).unwrap().acquired, 1);

    let err = receipt.confirmed().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(coins(&store), 100);
    assert_eq!(store.cosmetic_by_id(1).unwrap().acquired, 0);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn purchase_confirmed_keeps_optimistic_state() {
    let (store, backend) = loaded(100).await;
    let (_sub, seen) = record(&store);

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    receipt.confirmed().await.unwrap();

    assert_eq!(coins(&store), 70);
    assert_eq!(store.acquired_cosmetics_by_type(1).len(), 2);
    assert_eq!(backend.arguments(Route::Purchase), vec![1]);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn purchase_body_reporting_failure_rolls_back() {
    let (store, backend) = loaded(100).await;
    backend.respond(
        Route::Purchase,
        json!({"success": false, "message": "out of stock"}),
    );

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    assert!(receipt.confirmed().await.is_err());
    assert_eq!(coins(&store), 100);
}

#[tokio::test]
async fn purchase_validation_is_local() {
    let (store, backend) = loaded(100).await;
    let (_sub, seen) = record(&store);

    assert!(matches!(
        store.purchase_cosmetic(99).await,
        Err(AppyError::NotFound(_))
    ));
    assert!(matches!(
        store.purchase_cosmetic(2).await,
        Err(AppyError::Conflict(_))
    ));
    assert!(matches!(
        store.purchase_cosmetic(4).await,
        Err(AppyError::InsufficientFunds {
            required: 500,
            available: 100
        })
    ));
    assert_eq!(backend.calls(Route::Purchase), 0);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(coins(&store), 100);
}

#[tokio::test]
async fn rollback_does_not_clobber_later_balance_changes() {
    let (store, backend) = loaded(100).await;
    backend
        .fail(Route::Purchase, 500)
        .delay(Route::Purchase, Duration::from_millis(50));

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    assert!(store.update_stats_from_quit_response(&json!({"success": true, "coins": 5})));
    receipt.confirmed().await.unwrap_err();
    assert_eq!(coins(&store), 75);
    assert_eq!(store.cosmetic_by_id(1).unwrap().acquired, 0);
}

#[tokio::test]
async fn rollback_after_refresh_keeps_the_server_balance() {
    let (store, backend) = loaded(100).await;
    backend
        .fail(Route::Purchase, 500)
        .delay(Route::Purchase, Duration::from_millis(100));

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    assert_eq!(coins(&store), 70);
    store.refresh_section(Section::UserInfo).await.unwrap();
    assert_eq!(coins(&store), 100);

    receipt.confirmed().await.unwrap_err();
    assert_eq!(coins(&store), 100);
    assert_eq!(store.cosmetic_by_id(1).unwrap().acquired, 0);
}

#[tokio::test]
async fn rollback_after_refresh_with_a_new_balance_keeps_it() {
    let (store, backend) = loaded(100).await;
    backend
        .fail(Route::Purchase, 500)
        .delay(Route::Purchase, Duration::from_millis(100));

    let receipt = store.purchase_cosmetic(1).await.unwrap();
    backend.respond(Route::Section(Section::UserInfo), fixtures::user_info(90));
    store.load_app_data().await.unwrap();
    assert_eq!(coins(&store), 90);

    receipt.confirmed().await.unwrap_err();
    assert_eq!(coins(&store), 90);
}

// --- equip ---

#[tokio::test]
async fn equip_marks_exactly_one_item_per_type() {
    let (store, _backend) = loaded(100).await;
    let before = store.snapshot();

    assert!(store.equip_cosmetics(EquipSelection {
        avatar: Some(1),
        frame: Some(4),
        ..EquipSelection::default()
    }));

    let equipped_avatars: Vec<i64> = store
        .cosmetics_by_type(1)
        .iter()
        .filter(|c| c.equipped == 1)
        .map(|c| c.id)
        .collect();
    assert_eq!(equipped_avatars, vec![1]);
    assert_eq!(store.cosmetic_by_id(4).unwrap().equipped, 1);
    // The background group was not touched.
    assert_eq!(store.cosmetic_by_id(3).unwrap().equipped, 0);

    let user = store.user().unwrap();
    assert_eq!(
        user.avatar_url.as_deref(),
        Some("https://cdn.example.com/shop/owl.png")
    );
    assert_eq!(
        user.frame_url.as_deref(),
        Some("https://cdn.example.com/shop/gold.png")
    );

    // Earlier snapshots are values and stay as they were.
    let old_user = before.user_info.as_ref().unwrap().user.as_ref().unwrap();
    assert_eq!(
        old_user.avatar_url.as_deref(),
        Some("https://cdn.example.com/avatars/owl.png")
    );
    assert_eq!(before.cosmetics[1].equipped, 1);
}

#[tokio::test]
async fn equip_without_user_is_refused() {
    let (store, _backend) = store_with(MockBackend::new());
    let (_sub, seen) = record(&store);
    assert!(!store.equip_cosmetics(EquipSelection {
        avatar: Some(1),
        ..EquipSelection::default()
    }));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn use_cosmetics_confirms_each_slot_with_backend() {
    let (store, backend) = loaded(100).await;
    assert!(store
        .use_cosmetics(EquipSelection {
            background: Some(3),
            ..EquipSelection::default()
        })
        .await
        .unwrap());
    assert_eq!(backend.arguments(Route::UseCosmetic), vec![3]);
    assert_eq!(store.cosmetic_by_id(3).unwrap().equipped, 1);
}

// --- tribes ---

#[tokio::test]
async fn joining_a_tribe_flags_exactly_that_tribe() {
    let (store, backend) = loaded(100).await;
    store.join_tribe(1).await.unwrap();

    let mine: Vec<i64> = store
        .tribes()
        .iter()
        .filter(|t| t.my_tribe == 1)
        .map(|t| t.id)
        .collect();
    assert_eq!(mine, vec![1]);
    let user = store.user().unwrap();
    assert_eq!(user.tribes.len(), 1);
    assert_eq!(user.tribes[0].name.as_deref(), Some("Owls"));
    assert_eq!(backend.arguments(Route::JoinTribe), vec![1]);

    store.leave_tribe().await.unwrap();
    assert!(!store.is_in_tribe());
    assert!(store.user().unwrap().tribes.is_empty());
    assert_eq!(store.available_tribes().len(), 3);
}

#[tokio::test]
async fn failed_join_leaves_membership_untouched() {
    let (store, backend) = loaded(100).await;
    backend.fail(Route::JoinTribe, 403);
    assert!(matches!(store.join_tribe(1).await, Err(AppyError::Forbidden)));
    assert_eq!(store.user_tribe().unwrap().id, 2);
}

// --- stats, organization, config ---

#[tokio::test]
async fn quit_response_increments_stats() {
    let (store, _backend) = loaded(100).await;
    assert!(store.update_stats_from_quit_response(
        &json!({"success": true, "coins": 10, "stars": 2, "xp": 15})
    ));
    let stats = store.user_stats().unwrap();
    assert_eq!(stats.coins, 110);
    assert_eq!(stats.stars, 14);
    assert_eq!(stats.points, 265);

    assert!(!store.update_stats_from_quit_response(&json!({"success": false, "coins": 10})));
    assert_eq!(coins(&store), 110);
}

#[tokio::test]
async fn organization_info_comes_from_logon_user() {
    let (store, backend) = loaded(100).await;
    let info = store.load_organization_data().await.unwrap().unwrap();
    assert_eq!(info.name, "Lovelace Academy");
    assert_eq!(info.id, Some(7));
    assert_eq!(
        store.organization_logo_url().as_deref(),
        Some("https://cdn.example.com/org/logo.png")
    );
    assert_eq!(backend.calls(Route::LogonUser), 1);

    // A later bulk load keeps it.
    store.load_app_data().await.unwrap();
    assert!(store.organization_info().is_some());
}

#[tokio::test]
async fn user_config_defaults_and_updates() {
    let (store, _backend) = store_with(MockBackend::new());
    assert!(store.should_randomize_answers());
    assert!(!store.has_full_access());

    store.set_user_config(appy_core::model::UserConfig {
        random_position: 0,
        full_access: 1,
    });
    assert!(!store.should_randomize_answers());
    assert!(store.has_full_access());
}

// --- accessors ---

#[tokio::test]
async fn badge_partitions() {
    let (store, _backend) = loaded(100).await;
    assert_eq!(store.completed_badges().len(), 1);
    assert_eq!(store.in_progress_badges()[0].code.as_deref(), Some("STREAK"));
    assert_eq!(store.available_badges()[0].id, 3);
    assert_eq!(store.badge_by_code("GENIUS").unwrap().id, 3);
    assert!(store.badge_by_id(9).is_none());
}

#[tokio::test]
async fn star_accessors_default_to_zero() {
    let (store, _backend) = loaded(100).await;
    assert_eq!(store.total_stars().earned_stars, 12);
    assert_eq!(store.area_stars(1).earned_stars, 10);
    assert_eq!(store.area_stars(99).max_stars, 0);
    assert_eq!(store.category_stars(99).earned_stars, 0);
    assert_eq!(store.content_stars(100).stars.easy, 1);
    assert_eq!(store.content_stars(99).total_stars, 0);
}

#[tokio::test]
async fn discipline_lookups() {
    let (store, _backend) = loaded(100).await;
    assert_eq!(store.content_by_id(1, 10, 101).unwrap().title.as_deref(), Some("Inequalities"));
    assert!(store.category_by_id(2, 10).is_none());
    assert_eq!(store.all_categories().len(), 2);
    assert_eq!(store.all_contents().len(), 2);
}

#[tokio::test]
async fn battle_history_from_cached_battles() {
    let (store, _backend) = loaded(100).await;
    let history = store.battle_history();
    assert_eq!(history.pending.len(), 1);
    assert_eq!(history.completed.len(), 2);
    assert_eq!(history.completed[0].battle_session_id, 2);
    assert!(store.battle_by_id(4).is_some());
}

#[tokio::test]
async fn available_challenges_are_published_and_sorted() {
    let (store, _backend) = loaded(100).await;
    let ids: Vec<i64> = store.available_challenges().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![6, 2, 4, 5, 1]);
}

#[tokio::test]
async fn random_quote_uses_backend_quotes() {
    let (store, _backend) = loaded(100).await;
    assert_eq!(store.random_quote_by_percentage(95.0), "Top marks!");
    assert_eq!(store.random_quote_by_percentage(20.0), "Keep going");
}

// --- lifecycle ---

#[tokio::test]
async fn freshness_after_load() {
    let (store, _backend) = store_with(fixtures::scripted_backend(100));
    assert!(!store.is_data_fresh());
    let report = store.check_data_freshness(true).await;
    assert!(report.is_stale);
    assert!(report.reloaded);
    assert!(store.is_data_fresh());

    let again = store.check_data_freshness(true).await;
    assert!(!again.is_stale);
    assert!(!again.reloaded);
    assert_eq!(again.minutes_since_update, Some(0));

    store.on_app_background();
    assert!(!store.on_app_foreground());
}

#[tokio::test]
async fn clear_data_empties_the_cache() {
    let (store, _backend) = loaded(100).await;
    let (_sub, seen) = record(&store);
    store.clear_data().await;

    let data = store.snapshot();
    assert!(data.user_info.is_none());
    assert!(data.cosmetics.is_empty());
    assert!(data.last_updated.is_none());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dropped_subscription_stops_notifications() {
    let (store, _backend) = loaded(100).await;
    let (sub, seen) = record(&store);
    store.update_stats_from_quit_response(&json!({"success": true, "coins": 1}));
    drop(sub);
    store.update_stats_from_quit_response(&json!({"success": true, "coins": 1}));
    assert_eq!(seen.lock().unwrap().len(), 1);
}
