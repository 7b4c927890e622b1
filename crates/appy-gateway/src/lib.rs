// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated request gateway for the Appy backend.
//!
//! [`ApiGateway`] is a cheap, cloneable handle to a single worker task.
//! Every call, from any clone, is queued on one channel and executed in
//! FIFO order by the worker, which owns the session and performs token
//! refresh, the single retry after a 401 and header-driven token rotation.

pub mod client;
pub mod endpoints;
mod session;
pub mod types;
mod worker;

use std::sync::Arc;

use appy_config::model::ApiConfig;
use appy_core::model::UserConfig;
use appy_core::{AppyError, Backend, RankingKind, Section, TokenStore};
use async_trait::async_trait;
use reqwest::Method;
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

pub use client::HttpClient;
pub use types::{ApiResponse, LoginOutcome, PasswordResponse, RequestOptions, SessionInfo};

use crate::worker::{Command, Worker};

/// Commands buffered before callers start waiting to enqueue.
const COMMAND_BUFFER: usize = 64;

/// Handle to the gateway worker.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    commands: mpsc::Sender<Command>,
}

impl ApiGateway {
    /// Builds the HTTP client and spawns the worker on the current Tokio runtime.
    ///
    /// The persisted session is loaded lazily by the first command.
    pub fn new(config: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self, AppyError> {
        let http = HttpClient::new(config)?;
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(Worker::new(http, store, config).run(rx));
        Ok(Self { commands: tx })
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, AppyError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| AppyError::Closed)?;
        rx.await.map_err(|_| AppyError::Closed)
    }

    /// Loads the persisted session if that has not happened yet.
    pub async fn init(&self) -> Result<(), AppyError> {
        self.ask(|reply| Command::Init { reply }).await
    }

    /// Signs in, persists the new session and fetches the user record.
    pub async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<LoginOutcome, AppyError> {
        let email = email.to_string();
        self.ask(|reply| Command::Login {
            email,
            password,
            reply,
        })
        .await?
    }

    /// Notifies the backend (best effort) and always clears the local session.
    pub async fn logout(&self) -> Result<(), AppyError> {
        self.ask(|reply| Command::Logout { reply }).await?
    }

    pub async fn is_authenticated(&self) -> Result<bool, AppyError> {
        self.ask(|reply| Command::IsAuthenticated { reply }).await
    }

    /// Checks the session against `logon_user`.
    ///
    /// `None` means signed out or not currently valid. A 401 or 400 also
    /// clears the stored session.
    pub async fn validate_session(&self) -> Result<Option<UserConfig>, AppyError> {
        self.ask(|reply| Command::ValidateSession { reply }).await
    }

    /// Forces a token refresh.
    pub async fn refresh_access_token(&self) -> Result<(), AppyError> {
        self.ask(|reply| Command::Refresh { reply }).await?
    }

    /// Masked view of the current session.
    pub async fn session_info(&self) -> Result<SessionInfo, AppyError> {
        self.ask(|reply| Command::SessionInfo { reply }).await
    }

    /// Queues one request and waits for its settled result.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, AppyError> {
        let path = path.to_string();
        self.ask(|reply| Command::Request {
            path,
            options,
            reply,
        })
        .await?
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, AppyError> {
        let options = RequestOptions {
            body,
            ..RequestOptions::new(method)
        };
        Ok(self.request(path, options).await?.body)
    }

    pub async fn get(&self, path: &str) -> Result<Value, AppyError> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, AppyError> {
        self.call(Method::POST, path, Some(body)).await
    }

    /// `POST` without a body, the shape of most list endpoints.
    pub async fn post_empty(&self, path: &str) -> Result<Value, AppyError> {
        self.call(Method::POST, path, None).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, AppyError> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, AppyError> {
        self.call(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, AppyError> {
        self.call(Method::DELETE, path, None).await
    }
}

#[async_trait]
impl Backend for ApiGateway {
    async fn fetch_section(&self, section: Section) -> Result<Value, AppyError> {
        let path = endpoints::section_endpoint(section)
            .ok_or_else(|| AppyError::UnknownSection(section.to_string()))?;
        self.post_empty(path).await
    }

    async fn fetch_rankings(&self, kind: RankingKind) -> Result<Value, AppyError> {
        self.post(endpoints::RANKING, json!({ "type": kind })).await
    }

    async fn logon_user(&self) -> Result<Value, AppyError> {
        self.get_logon_user().await
    }

    async fn purchase_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        ApiGateway::purchase_cosmetic(self, cosmetic_id).await
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<Value, AppyError> {
        self.mark_notification_as_read(notification_id.into()).await
    }

    async fn use_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        ApiGateway::use_cosmetic(self, cosmetic_id).await
    }

    async fn join_tribe(&self, tribe_id: i64) -> Result<Value, AppyError> {
        ApiGateway::join_tribe(self, tribe_id).await
    }

    async fn leave_tribe(&self) -> Result<Value, AppyError> {
        ApiGateway::leave_tribe(self).await
    }
}
