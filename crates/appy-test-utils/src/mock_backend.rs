// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted backend for deterministic data-store tests.
//!
//! `MockBackend` implements [`Backend`] with per-route replies. A route can
//! carry a sticky reply (returned on every call) and a queue of one-shot
//! replies that take precedence until exhausted. Unscripted routes answer
//! `{"success": true}`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use appy_core::{AppyError, Backend, RankingKind, Section};

/// A backend call, as recorded by [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Section(Section),
    Rankings(RankingKind),
    LogonUser,
    Purchase,
    MarkRead,
    UseCosmetic,
    JoinTribe,
    LeaveTribe,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16),
    Network,
}

impl Reply {
    fn into_result(self) -> Result<Value, AppyError> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Status(401) => Err(AppyError::Unauthorized),
            Reply::Status(403) => Err(AppyError::Forbidden),
            Reply::Status(status) => Err(AppyError::RequestFailed {
                status,
                message: "mock failure".to_string(),
            }),
            Reply::Network => Err(AppyError::Network {
                message: "mock connection refused".to_string(),
                source: None,
            }),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    once: VecDeque<Reply>,
    sticky: Option<Reply>,
    delay: Option<Duration>,
}

/// A [`Backend`] whose replies are scripted per [`Route`].
#[derive(Debug, Default)]
pub struct MockBackend {
    scripts: Mutex<HashMap<Route, Script>>,
    calls: Mutex<Vec<(Route, Option<i64>)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn script<R>(&self, route: Route, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        f(scripts.entry(route).or_default())
    }

    /// Answer every call on `route` with `body`.
    pub fn respond(&self, route: Route, body: Value) -> &Self {
        self.script(route, |s| s.sticky = Some(Reply::Json(body)));
        self
    }

    /// Answer the next unanswered call on `route` with `body`.
    pub fn respond_once(&self, route: Route, body: Value) -> &Self {
        self.script(route, |s| s.once.push_back(Reply::Json(body)));
        self
    }

    /// Fail every call on `route` with an HTTP status.
    pub fn fail(&self, route: Route, status: u16) -> &Self {
        self.script(route, |s| s.sticky = Some(Reply::Status(status)));
        self
    }

    /// Fail the next unanswered call on `route` with an HTTP status.
    pub fn fail_once(&self, route: Route, status: u16) -> &Self {
        self.script(route, |s| s.once.push_back(Reply::Status(status)));
        self
    }

    /// Fail every call on `route` at the transport level.
    pub fn fail_network(&self, route: Route) -> &Self {
        self.script(route, |s| s.sticky = Some(Reply::Network));
        self
    }

    /// Hold every call on `route` for `delay` before replying.
    pub fn delay(&self, route: Route, delay: Duration) -> &Self {
        self.script(route, |s| s.delay = Some(delay));
        self
    }

    /// Number of calls made on `route`.
    pub fn calls(&self, route: Route) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(r, _)| *r == route)
            .count()
    }

    /// Every call in the order it was made.
    pub fn call_log(&self) -> Vec<Route> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(r, _)| *r)
            .collect()
    }

    /// Ids passed to `route`, in call order.
    pub fn arguments(&self, route: Route) -> Vec<i64> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(r, _)| *r == route)
            .filter_map(|(_, id)| *id)
            .collect()
    }

    async fn dispatch(&self, route: Route, argument: Option<i64>) -> Result<Value, AppyError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((route, argument));

        let (reply, delay) = self.script(route, |s| {
            let reply = s
                .once
                .pop_front()
                .or_else(|| s.sticky.clone())
                .unwrap_or_else(|| Reply::Json(json!({ "success": true })));
            (reply, s.delay)
        });

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.into_result()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_section(&self, section: Section) -> Result<Value, AppyError> {
        if section == Section::Rankings {
            return Err(AppyError::UnknownSection(section.to_string()));
        }
        self.dispatch(Route::Section(section), None).await
    }

    async fn fetch_rankings(&self, kind: RankingKind) -> Result<Value, AppyError> {
        self.dispatch(Route::Rankings(kind), None).await
    }

    async fn logon_user(&self) -> Result<Value, AppyError> {
        self.dispatch(Route::LogonUser, None).await
    }

    async fn purchase_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        self.dispatch(Route::Purchase, Some(cosmetic_id)).await
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<Value, AppyError> {
        self.dispatch(Route::MarkRead, Some(notification_id)).await
    }

    async fn use_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        self.dispatch(Route::UseCosmetic, Some(cosmetic_id)).await
    }

    async fn join_tribe(&self, tribe_id: i64) -> Result<Value, AppyError> {
        self.dispatch(Route::JoinTribe, Some(tribe_id)).await
    }

    async fn leave_tribe(&self) -> Result<Value, AppyError> {
        self.dispatch(Route::LeaveTribe, None).await
    }
}
