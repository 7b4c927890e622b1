// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The data store: cache, mutations and subscriber notification.
//!
//! Readers load the current [`AppData`] snapshot without locking. Writers
//! serialize on a short lock, clone the snapshot, change the clone and
//! publish it. Network calls never happen while that lock is held, so
//! section refreshes issued in parallel are not ordered against each other.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use appy_config::AppyConfig;
use appy_core::model::{Cosmetic, NewsItem, Notification, OrganizationInfo, RankingSnapshot, User, UserConfig};
use appy_core::{AppyError, Backend, CosmeticSlot, NotificationTarget, RankingKind, Section};
use arc_swap::ArcSwap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::data::{AppData, LoadStatus, Rankings};
use crate::delta::{Delta, Mutation};
use crate::freshness::{FreshnessPolicy, FreshnessReport};
use crate::images::ImageCache;
use crate::normalize::{self, SectionPayload};
use crate::rankings;
use crate::rewrite;
use crate::subscribers::{Callback, Subscribers, Subscription};

/// Outcome of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Sections that fell back to their empty default.
    pub failed_sections: Vec<Section>,
    /// Ranking metrics left empty.
    pub failed_rankings: Vec<RankingKind>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed_sections.is_empty() && self.failed_rankings.is_empty()
    }
}

/// Result of an id-set diff on news or notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub has_changes: bool,
    /// Ids not present in the previous list, in server order.
    pub new_items: Vec<i64>,
}

/// Cosmetics to equip, one optional id per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquipSelection {
    pub avatar: Option<i64>,
    pub background: Option<i64>,
    pub frame: Option<i64>,
}

impl EquipSelection {
    fn slots(&self) -> impl Iterator<Item = (CosmeticSlot, i64)> {
        [
            (CosmeticSlot::Avatar, self.avatar),
            (CosmeticSlot::Background, self.background),
            (CosmeticSlot::Frame, self.frame),
        ]
        .into_iter()
        .filter_map(|(slot, id)| id.map(|id| (slot, id)))
    }
}

/// The optimistic state of a purchase plus its pending confirmation.
#[derive(Debug)]
pub struct PurchaseReceipt {
    pub new_coins: i64,
    pub cosmetic: Cosmetic,
    confirmation: JoinHandle<Result<(), AppyError>>,
}

impl PurchaseReceipt {
    /// Waits for the backend. On failure the purchase has already been
    /// rolled back and subscribers notified.
    pub async fn confirmed(self) -> Result<(), AppyError> {
        self.confirmation
            .await
            .map_err(|e| AppyError::Internal(format!("purchase confirmation task failed: {e}")))?
    }
}

#[derive(Debug, Default)]
struct SeenIds {
    news: HashSet<i64>,
    notifications: HashSet<i64>,
}

struct Inner {
    backend: Arc<dyn Backend>,
    images: ImageCache,
    freshness: FreshnessPolicy,
    data: ArcSwap<AppData>,
    status: Mutex<LoadStatus>,
    writer: Mutex<()>,
    subscribers: Arc<Subscribers>,
    seen: Mutex<SeenIds>,
    user_config: Mutex<UserConfig>,
    backgrounded_at: Mutex<Option<DateTime<Utc>>>,
}

/// Cheap-to-clone handle to the shared cache.
#[derive(Clone)]
pub struct DataStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("status", &*lock(&self.inner.status))
            .field("subscribers", &self.inner.subscribers.len())
            .field("images", &self.inner.images)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// ISO-8601 UTC timestamp with milliseconds, as the backend writes `readAt`.
fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Rejects a 2xx body that still reports `success: false`.
fn ensure_success(body: Value, action: &str) -> Result<Value, AppyError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("backend reported failure")
            .to_string();
        return Err(AppyError::RequestFailed {
            status: 200,
            message: format!("{action}: {message}"),
        });
    }
    Ok(body)
}

fn assign(data: &mut AppData, payload: SectionPayload) {
    match payload {
        SectionPayload::UserInfo(info) => data.user_info = Some(info),
        SectionPayload::Disciplines(areas) => data.disciplines = areas,
        SectionPayload::UserStars(stars) => data.user_stars = Some(stars),
        SectionPayload::UserChests(chests) => data.user_chests = Some(chests),
        SectionPayload::Tribes(tribes) => data.tribes = tribes,
        SectionPayload::Notifications(incoming) => {
            data.notifications = normalize::merge_notifications(&data.notifications, incoming);
        }
        SectionPayload::News(news) => data.news = news,
        SectionPayload::Challenges(challenges) => data.challenges = challenges,
        SectionPayload::Cosmetics(cosmetics) => data.cosmetics = cosmetics,
        SectionPayload::Quotes(quotes) => data.quotes = quotes,
        SectionPayload::Battles(battles) => data.battles = battles,
    }
}

/// Diffs an id list against the previous one and records it when changed.
fn diff_ids(previous: &mut HashSet<i64>, current: &[i64]) -> ChangeSet {
    let ids: HashSet<i64> = current.iter().copied().collect();
    if ids == *previous {
        return ChangeSet::default();
    }
    let new_items = current
        .iter()
        .copied()
        .filter(|id| !previous.contains(id))
        .collect();
    *previous = ids;
    ChangeSet {
        has_changes: true,
        new_items,
    }
}

impl DataStore {
    pub fn new(backend: Arc<dyn Backend>, images: ImageCache, freshness: FreshnessPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                images,
                freshness,
                data: ArcSwap::from_pointee(AppData::default()),
                status: Mutex::new(LoadStatus::default()),
                writer: Mutex::new(()),
                subscribers: Arc::new(Subscribers::default()),
                seen: Mutex::new(SeenIds::default()),
                user_config: Mutex::new(UserConfig::default()),
                backgrounded_at: Mutex::new(None),
            }),
        }
    }

    /// A store with pass-through images and default freshness thresholds.
    pub fn with_defaults(backend: Arc<dyn Backend>) -> Self {
        Self::new(backend, ImageCache::passthrough(), FreshnessPolicy::default())
    }

    pub fn from_config(backend: Arc<dyn Backend>, config: &AppyConfig) -> Result<Self, AppyError> {
        Ok(Self::new(
            backend,
            ImageCache::from_config(&config.images)?,
            FreshnessPolicy::from(&config.freshness),
        ))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<AppData> {
        self.inner.data.load_full()
    }

    pub fn status(&self) -> LoadStatus {
        lock(&self.inner.status).clone()
    }

    pub fn images(&self) -> &ImageCache {
        &self.inner.images
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        self.inner.freshness
    }

    /// Registers `callback` for every change until the returned handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<AppData>, bool, Option<&str>) + Send + Sync + 'static,
    {
        let callback: Arc<Callback> = Arc::new(callback);
        self.inner.subscribers.add(callback)
    }

    fn notify(&self) {
        let data = self.snapshot();
        let status = self.status();
        self.inner
            .subscribers
            .notify(&data, status.loading, status.error.as_deref());
    }

    fn set_status(&self, loading: bool, error: Option<String>) {
        *lock(&self.inner.status) = LoadStatus { loading, error };
    }

    /// Applies `f` to a copy of the snapshot and publishes it.
    fn update<R>(&self, f: impl FnOnce(&mut AppData) -> R) -> R {
        let _writer = lock(&self.inner.writer);
        let mut next = AppData::clone(&self.inner.data.load());
        let out = f(&mut next);
        self.inner.data.store(Arc::new(next));
        out
    }

    /// Like [`Self::update`], but publishes only when `f` succeeds.
    fn try_update<R>(
        &self,
        f: impl FnOnce(&mut AppData) -> Result<R, AppyError>,
    ) -> Result<R, AppyError> {
        let _writer = lock(&self.inner.writer);
        let mut next = AppData::clone(&self.inner.data.load());
        let out = f(&mut next)?;
        self.inner.data.store(Arc::new(next));
        Ok(out)
    }

    async fn fetch_payload(&self, section: Section) -> Result<SectionPayload, AppyError> {
        let body = self.inner.backend.fetch_section(section).await?;
        let payload = normalize::section(section, body)?;
        Ok(rewrite::section(&self.inner.images, payload).await)
    }

    async fn fetch_ranking(&self, kind: RankingKind) -> Result<RankingSnapshot, AppyError> {
        let body = self.inner.backend.fetch_rankings(kind).await?;
        normalize::ranking(body)
    }

    /// Loads every section one after the other and publishes them together.
    ///
    /// A failing section is logged and left at its default. Subscribers see
    /// one `loading` notification at the start and one when the batch lands.
    /// Fails only when nothing at all could be fetched.
    pub async fn load_app_data(&self) -> Result<LoadReport, AppyError> {
        self.set_status(true, None);
        self.notify();
        info!("loading app data");

        let mut report = LoadReport::default();
        let mut payloads = Vec::new();
        let mut rankings = Rankings::default();
        let mut last_error = None;

        for section in Section::ALL {
            if section == Section::Rankings {
                for kind in RankingKind::ALL {
                    match self.fetch_ranking(kind).await {
                        Ok(snapshot) => rankings.set(kind, Some(Arc::new(snapshot))),
                        Err(e) => {
                            warn!(ranking = %kind, error = %e, "ranking failed to load");
                            report.failed_rankings.push(kind);
                            last_error = Some(e);
                        }
                    }
                }
                continue;
            }
            match self.fetch_payload(section).await {
                Ok(payload) => payloads.push((section, payload)),
                Err(e) => {
                    warn!(section = %section, error = %e, "section failed to load, using default");
                    report.failed_sections.push(section);
                    last_error = Some(e);
                }
            }
        }

        let attempted = Section::ALL.len() - 1 + RankingKind::ALL.len();
        let failed = report.failed_sections.len() + report.failed_rankings.len();
        if failed == attempted
            && let Some(e) = last_error
        {
            let message = format!("failed to load app data: {e}");
            warn!(error = %e, "every section failed to load");
            self.set_status(false, Some(message));
            self.notify();
            return Err(e);
        }

        let news_ids: Vec<i64> = payloads
            .iter()
            .find_map(|(_, p)| match p {
                SectionPayload::News(items) => Some(items.iter().map(|n| n.id).collect()),
                _ => None,
            })
            .unwrap_or_default();

        let now = Utc::now();
        let has_rankings = report.failed_rankings.len() < RankingKind::ALL.len();
        let notification_ids = self.update(|data| {
            let local = std::mem::take(&mut data.notifications);
            let organization_info = data.organization_info.take();
            *data = AppData {
                organization_info,
                rankings,
                ..AppData::default()
            };
            for (section, payload) in payloads {
                match payload {
                    SectionPayload::Notifications(incoming) => {
                        data.notifications = normalize::merge_notifications(&local, incoming);
                    }
                    other => assign(data, other),
                }
                data.stamp(section, now);
            }
            if has_rankings {
                data.stamp(Section::Rankings, now);
            }
            data.last_updated = Some(now);
            data.notifications.iter().map(|n| n.id).collect::<HashSet<_>>()
        });

        {
            let mut seen = lock(&self.inner.seen);
            seen.news = news_ids.into_iter().collect();
            seen.notifications = notification_ids;
        }

        self.set_status(false, None);
        self.notify();
        info!(
            failed_sections = report.failed_sections.len(),
            failed_rankings = report.failed_rankings.len(),
            "app data loaded"
        );
        Ok(report)
    }

    /// Re-fetches one section and notifies. Errors propagate.
    pub async fn refresh_section(&self, section: Section) -> Result<Arc<AppData>, AppyError> {
        if section == Section::Rankings {
            return Err(AppyError::UnknownSection(section.to_string()));
        }
        let payload = self.fetch_payload(section).await?;
        self.update(|data| {
            assign(data, payload);
            data.stamp(section, Utc::now());
        });
        debug!(section = %section, "section refreshed");
        self.notify();
        Ok(self.snapshot())
    }

    /// Replaces one ranking unconditionally.
    pub async fn refresh_rankings(&self, kind: RankingKind) -> Result<Arc<RankingSnapshot>, AppyError> {
        let snapshot = Arc::new(self.fetch_ranking(kind).await?);
        self.update(|data| {
            data.rankings.set(kind, Some(Arc::clone(&snapshot)));
            data.stamp(Section::Rankings, Utc::now());
        });
        self.notify();
        Ok(snapshot)
    }

    /// Fetches every ranking and replaces only those that changed.
    ///
    /// Metrics with nothing cached are fetched unconditionally; a failure
    /// there leaves the slot empty. A failure on a cached metric aborts the
    /// check with nothing applied. Returns whether anything was replaced.
    pub async fn check_and_update_rankings(&self) -> Result<bool, AppyError> {
        let current = self.snapshot();
        let mut updates = Vec::new();

        for kind in RankingKind::ALL {
            match current.rankings.get(kind) {
                None => match self.fetch_ranking(kind).await {
                    Ok(fresh) => updates.push((kind, Arc::new(fresh))),
                    Err(e) => warn!(ranking = %kind, error = %e, "ranking still unavailable"),
                },
                Some(cached) => {
                    let fresh = self.fetch_ranking(kind).await?;
                    if rankings::has_changed(cached, &fresh) {
                        debug!(ranking = %kind, "ranking changed");
                        updates.push((kind, Arc::new(fresh)));
                    }
                }
            }
        }

        if updates.is_empty() {
            debug!("rankings unchanged");
            return Ok(false);
        }

        self.update(|data| {
            for (kind, snapshot) in updates {
                data.rankings.set(kind, Some(snapshot));
            }
            data.stamp(Section::Rankings, Utc::now());
        });
        self.notify();
        Ok(true)
    }

    /// Marks one or all notifications read locally, then on the backend.
    ///
    /// The local change is visible to subscribers before the call; on
    /// failure exactly that change is undone and subscribers notified again.
    pub async fn mark_notification_as_read(
        &self,
        target: impl Into<NotificationTarget>,
    ) -> Result<(), AppyError> {
        let target = target.into();
        let read_at = timestamp(Utc::now());
        let mutation = self.update(|data| {
            let deltas = data
                .notifications
                .iter()
                .filter(|n| match target {
                    NotificationTarget::All => n.read_at.is_none(),
                    NotificationTarget::One(id) => n.id == id,
                })
                .map(|n| Delta::SetReadAt {
                    notification_id: n.id,
                    from: n.read_at.clone(),
                    to: Some(read_at.clone()),
                })
                .collect();
            let mutation = Mutation::new(deltas);
            mutation.apply(data);
            mutation
        });
        self.notify();

        let result = self
            .inner
            .backend
            .mark_notification_read(target.wire_id())
            .await
            .and_then(|body| ensure_success(body, "mark notification read"));
        if let Err(e) = result {
            warn!(notification = target.wire_id(), error = %e, "mark read failed, rolling back");
            self.update(|data| mutation.revert(data));
            self.notify();
            return Err(e);
        }
        Ok(())
    }

    /// Buys a cosmetic optimistically.
    ///
    /// Validation is local and fails fast. On success the balance and the
    /// item are updated and subscribers notified before the backend is
    /// asked; the returned receipt resolves once the backend answers.
    pub async fn purchase_cosmetic(&self, cosmetic_id: i64) -> Result<PurchaseReceipt, AppyError> {
        let (mutation, new_coins, cosmetic) = self.try_update(|data| {
            let item = data
                .cosmetics
                .iter()
                .find(|c| c.id == cosmetic_id)
                .ok_or_else(|| AppyError::NotFound(format!("cosmetic {cosmetic_id}")))?;
            if item.acquired == 1 {
                return Err(AppyError::Conflict(format!(
                    "cosmetic {cosmetic_id} already owned"
                )));
            }
            let price = item.coins;
            let balance = match data.user_info.as_ref().and_then(|i| i.user.as_ref()) {
                Some(user) if user.coins >= price => user.coins,
                user => {
                    return Err(AppyError::InsufficientFunds {
                        required: price,
                        available: user.map_or(0, |u| u.coins),
                    });
                }
            };

            let mutation = Mutation::new(vec![
                Delta::SetCoins {
                    from: balance,
                    to: balance - price,
                },
                Delta::SetAcquired {
                    cosmetic_id,
                    from: item.acquired,
                    to: 1,
                },
            ]);
            mutation.apply(data);
            let cosmetic = data
                .cosmetics
                .iter()
                .find(|c| c.id == cosmetic_id)
                .cloned()
                .unwrap_or_default();
            Ok((mutation, balance - price, cosmetic))
        })?;
        info!(cosmetic = cosmetic_id, new_coins, "cosmetic purchased locally");
        self.notify();

        let store = self.clone();
        let confirmation = tokio::spawn(async move {
            let result = store
                .inner
                .backend
                .purchase_cosmetic(cosmetic_id)
                .await
                .and_then(|body| ensure_success(body, "purchase cosmetic"));
            match result {
                Ok(_) => {
                    debug!(cosmetic = cosmetic_id, "purchase confirmed");
                    Ok(())
                }
                Err(e) => {
                    warn!(cosmetic = cosmetic_id, error = %e, "purchase rejected, rolling back");
                    let skipped = store.update(|data| mutation.revert(data));
                    if skipped > 0 {
                        debug!(cosmetic = cosmetic_id, skipped, "rollback kept newer values");
                    }
                    store.notify();
                    Err(e)
                }
            }
        });

        Ok(PurchaseReceipt {
            new_coins,
            cosmetic,
            confirmation,
        })
    }

    /// Equips cosmetics locally.
    ///
    /// Within each chosen item's type group only that item ends up equipped,
    /// and its image is projected onto a new copy of the profile. Unknown ids
    /// are skipped. Returns `false` when there is no user to equip.
    pub fn equip_cosmetics(&self, selection: EquipSelection) -> bool {
        let has_user = self
            .snapshot()
            .user_info
            .as_ref()
            .is_some_and(|info| info.user.is_some());
        if !has_user {
            warn!("cannot equip cosmetics without a user");
            return false;
        }

        self.update(|data| {
            let Some(mut user) = data.user_info.as_ref().and_then(|i| i.user.clone()) else {
                return;
            };
            for (slot, id) in selection.slots() {
                let Some(item) = data.cosmetics.iter().find(|c| c.id == id).cloned() else {
                    warn!(cosmetic = id, slot = %slot, "cosmetic not found, skipping");
                    continue;
                };
                let type_id = if item.cosmetic_type_id != 0 {
                    item.cosmetic_type_id
                } else {
                    slot.default_type_id()
                };
                for cosmetic in data
                    .cosmetics
                    .iter_mut()
                    .filter(|c| c.cosmetic_type_id == type_id)
                {
                    cosmetic.equipped = i64::from(cosmetic.id == id);
                }
                if let Some(url) = item.image_url {
                    let field = match slot {
                        CosmeticSlot::Avatar => &mut user.avatar_url,
                        CosmeticSlot::Background => &mut user.background_url,
                        CosmeticSlot::Frame => &mut user.frame_url,
                    };
                    *field = Some(url);
                }
            }
            if let Some(info) = data.user_info.as_mut() {
                info.user = Some(user);
            }
        });
        self.notify();
        true
    }

    /// Equips cosmetics on the backend, then locally.
    pub async fn use_cosmetics(&self, selection: EquipSelection) -> Result<bool, AppyError> {
        for (_, id) in selection.slots() {
            let body = self.inner.backend.use_cosmetic(id).await?;
            ensure_success(body, "use cosmetic")?;
        }
        Ok(self.equip_cosmetics(selection))
    }

    /// Records joining (or leaving) a tribe locally.
    ///
    /// Exactly the joined tribe is flagged `myTribe`, and the user's tribe
    /// list becomes that single tribe (or empty after leaving).
    pub fn update_user_tribe_membership(&self, tribe_id: i64, joined: bool) {
        self.update(|data| {
            for tribe in &mut data.tribes {
                tribe.my_tribe = i64::from(joined && tribe.id == tribe_id);
            }
            let joined_tribe = data.tribes.iter().find(|t| t.id == tribe_id).cloned();
            if let Some(user) = data.user_info.as_mut().and_then(|i| i.user.as_mut()) {
                match (joined, joined_tribe) {
                    (true, Some(tribe)) => {
                        user.tribes = vec![appy_core::model::TribeRef {
                            id: tribe.id,
                            name: tribe.name,
                            color: tribe.color,
                            icon: tribe.icon,
                        }];
                    }
                    (true, None) => {}
                    (false, _) => user.tribes.clear(),
                }
            }
        });
        self.notify();
    }

    pub async fn join_tribe(&self, tribe_id: i64) -> Result<(), AppyError> {
        let body = self.inner.backend.join_tribe(tribe_id).await?;
        ensure_success(body, "join tribe")?;
        info!(tribe = tribe_id, "joined tribe");
        self.update_user_tribe_membership(tribe_id, true);
        Ok(())
    }

    pub async fn leave_tribe(&self) -> Result<(), AppyError> {
        let current = self.user_tribe().map_or(0, |t| t.id);
        let body = self.inner.backend.leave_tribe().await?;
        ensure_success(body, "leave tribe")?;
        info!(tribe = current, "left tribe");
        self.update_user_tribe_membership(current, false);
        Ok(())
    }

    /// Fetches news and replaces the cache only if the id set changed.
    pub async fn load_news(&self) -> Result<ChangeSet, AppyError> {
        let body = self.inner.backend.fetch_section(Section::News).await?;
        let items: Vec<NewsItem> = normalize::list(body, "news")?;
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();

        let changes = diff_ids(&mut lock(&self.inner.seen).news, &ids);
        if !changes.has_changes {
            return Ok(changes);
        }
        self.update(|data| {
            data.news = items;
            data.stamp(Section::News, Utc::now());
        });
        debug!(new_items = changes.new_items.len(), "news changed");
        self.notify();
        Ok(changes)
    }

    /// Fetches notifications and replaces the cache only if the id set changed.
    pub async fn load_notifications(&self) -> Result<ChangeSet, AppyError> {
        let body = self.inner.backend.fetch_section(Section::Notifications).await?;
        let items: Vec<Notification> = normalize::list(body, "notifications")?;
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();

        let changes = diff_ids(&mut lock(&self.inner.seen).notifications, &ids);
        if !changes.has_changes {
            return Ok(changes);
        }
        self.update(|data| {
            data.notifications = normalize::merge_notifications(&data.notifications, items);
            data.stamp(Section::Notifications, Utc::now());
        });
        debug!(new_items = changes.new_items.len(), "notifications changed");
        self.notify();
        Ok(changes)
    }

    /// Adds the coins, stars and xp reported by a quiz quit response.
    ///
    /// Ignored unless the response reports success and a user is cached.
    pub fn update_stats_from_quit_response(&self, response: &Value) -> bool {
        if response.get("success").and_then(Value::as_bool) != Some(true) {
            return false;
        }
        let increment = |key: &str| response.get(key).and_then(Value::as_f64).map(|v| v as i64);
        let (coins, stars, xp) = (increment("coins"), increment("stars"), increment("xp"));

        let applied = self.update(|data| {
            let Some(user) = data.user_info.as_mut().and_then(|i| i.user.as_mut()) else {
                return false;
            };
            user.coins = user.coins.saturating_add(coins.unwrap_or(0));
            user.stars = user.stars.saturating_add(stars.unwrap_or(0));
            user.points = user.points.saturating_add(xp.unwrap_or(0));
            true
        });
        if applied {
            debug!(?coins, ?stars, ?xp, "stats updated from quiz quit");
            self.notify();
        }
        applied
    }

    /// Loads organization name, id and logo from the logon user payload.
    pub async fn load_organization_data(&self) -> Result<Option<OrganizationInfo>, AppyError> {
        let body = self.inner.backend.logon_user().await?;
        let success = body.get("success").and_then(Value::as_bool) == Some(true);
        let user = match body.get("user") {
            Some(user) if success && user.is_object() => user.clone(),
            _ => return Ok(self.snapshot().organization_info.clone()),
        };
        let user: User = serde_json::from_value(user).map_err(|e| AppyError::decode("logon user", e))?;

        let mut logo_url = user.organization_url.unwrap_or_default();
        if !logo_url.is_empty() {
            logo_url = self.inner.images.resolve(&logo_url).await;
        }
        let info = OrganizationInfo {
            id: user.organization_id,
            name: user.organization_name.unwrap_or_default(),
            logo_url,
        };
        self.update(|data| data.organization_info = Some(info.clone()));
        self.notify();
        Ok(Some(info))
    }

    pub fn set_user_config(&self, config: UserConfig) {
        *lock(&self.inner.user_config) = config;
    }

    pub fn user_config(&self) -> UserConfig {
        *lock(&self.inner.user_config)
    }

    pub fn should_randomize_answers(&self) -> bool {
        self.user_config().random_position == 1
    }

    pub fn has_full_access(&self) -> bool {
        self.user_config().full_access == 1
    }

    pub fn is_data_fresh(&self) -> bool {
        !self
            .inner
            .freshness
            .is_stale_at(self.snapshot().last_updated, Utc::now())
    }

    pub fn on_app_background(&self) {
        *lock(&self.inner.backgrounded_at) = Some(Utc::now());
    }

    /// Whether data should be reloaded after returning to the foreground.
    pub fn on_app_foreground(&self) -> bool {
        let backgrounded_at = lock(&self.inner.backgrounded_at).take();
        self.inner
            .freshness
            .should_reload_at(self.snapshot().last_updated, backgrounded_at, Utc::now())
    }

    /// Reports staleness and, with `auto_reload`, reloads stale data.
    pub async fn check_data_freshness(&self, auto_reload: bool) -> FreshnessReport {
        let mut report =
            FreshnessReport::at(&self.inner.freshness, self.snapshot().last_updated, Utc::now());
        if report.is_stale && auto_reload {
            match self.load_app_data().await {
                Ok(_) => report.reloaded = true,
                Err(e) => report.reload_error = Some(e.to_string()),
            }
        }
        report
    }

    /// Resets per-session state before a login: image cache and freshness timers.
    pub async fn begin_session(&self) {
        self.inner.images.clear().await;
        *lock(&self.inner.backgrounded_at) = None;
        debug!("session cache reset");
    }

    /// Drops every cached section and notifies.
    pub async fn clear_data(&self) {
        self.update(|data| *data = AppData::default());
        *lock(&self.inner.seen) = SeenIds::default();
        *lock(&self.inner.user_config) = UserConfig::default();
        self.set_status(false, None);
        self.inner.images.clear().await;
        info!("data store cleared");
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_ids_reports_new_items_in_order() {
        let mut previous: HashSet<i64> = [1, 2].into_iter().collect();
        let changes = diff_ids(&mut previous, &[3, 1, 2, 4]);
        assert!(changes.has_changes);
        assert_eq!(changes.new_items, vec![3, 4]);
        assert_eq!(previous.len(), 4);

        let again = diff_ids(&mut previous, &[4, 3, 2, 1]);
        assert_eq!(again, ChangeSet::default());
    }

    #[test]
    fn diff_ids_detects_removals() {
        let mut previous: HashSet<i64> = [1, 2].into_iter().collect();
        let changes = diff_ids(&mut previous, &[1]);
        assert!(changes.has_changes);
        assert!(changes.new_items.is_empty());
    }

    #[test]
    fn ensure_success_rejects_explicit_failure() {
        let err = ensure_success(serde_json::json!({"success": false, "message": "no"}), "buy")
            .unwrap_err();
        assert!(matches!(err, AppyError::RequestFailed { status: 200, .. }));
        assert!(ensure_success(serde_json::json!({"ok": 1}), "buy").is_ok());
    }

    #[test]
    fn equip_selection_yields_only_chosen_slots() {
        let selection = EquipSelection {
            avatar: Some(1),
            frame: Some(4),
            ..EquipSelection::default()
        };
        let slots: Vec<_> = selection.slots().collect();
        assert_eq!(slots, vec![(CosmeticSlot::Avatar, 1), (CosmeticSlot::Frame, 4)]);
    }
}
