// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The gateway worker: a single task that owns the session and executes
//! commands strictly in arrival order.
//!
//! Because every command, including token refresh and rotation, completes
//! before the next one is received, concurrent callers never race on the
//! session and at most one refresh is ever in flight.

use std::sync::Arc;

use appy_config::model::ApiConfig;
use appy_core::model::{User, UserConfig};
use appy_core::{AppyError, TokenStore};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::client::{HttpClient, RawResponse, Rotation};
use crate::endpoints;
use crate::session::{expiry_from_now, Session};
use crate::types::{
    ApiResponse, LoginOutcome, LoginRequest, RefreshRequest, RequestOptions, SessionInfo,
    TokenResponse,
};

pub(crate) type Reply<T> = oneshot::Sender<T>;

/// Messages accepted by the worker. Each carries its own reply channel.
pub(crate) enum Command {
    Init {
        reply: Reply<()>,
    },
    Request {
        path: String,
        options: RequestOptions,
        reply: Reply<Result<ApiResponse, AppyError>>,
    },
    Login {
        email: String,
        password: SecretString,
        reply: Reply<Result<LoginOutcome, AppyError>>,
    },
    Logout {
        reply: Reply<Result<(), AppyError>>,
    },
    Refresh {
        reply: Reply<Result<(), AppyError>>,
    },
    IsAuthenticated {
        reply: Reply<bool>,
    },
    ValidateSession {
        reply: Reply<Option<UserConfig>>,
    },
    SessionInfo {
        reply: Reply<SessionInfo>,
    },
}

pub(crate) struct Worker {
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    session: Session,
    initialized: bool,
    refresh_buffer_ms: i64,
    default_expires_in_secs: u64,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Worker {
    pub fn new(http: HttpClient, store: Arc<dyn TokenStore>, config: &ApiConfig) -> Self {
        Self {
            http,
            store,
            session: Session::default(),
            initialized: false,
            refresh_buffer_ms: (config.refresh_buffer_secs as i64).saturating_mul(1000),
            default_expires_in_secs: config.default_expires_in_secs,
        }
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.init().await;
            // A dropped receiver means the caller gave up; the command still ran.
            match command {
                Command::Init { reply } => {
                    let _ = reply.send(());
                }
                Command::Request {
                    path,
                    options,
                    reply,
                } => {
                    let result = self.execute(&path, &options).await;
                    let _ = reply.send(result);
                }
                Command::Login {
                    email,
                    password,
                    reply,
                } => {
                    let result = self.login(&email, &password).await;
                    let _ = reply.send(result);
                }
                Command::Logout { reply } => {
                    let _ = reply.send(self.logout().await);
                }
                Command::Refresh { reply } => {
                    let _ = reply.send(self.refresh().await);
                }
                Command::IsAuthenticated { reply } => {
                    let _ = reply.send(self.session.is_authenticated());
                }
                Command::ValidateSession { reply } => {
                    let _ = reply.send(self.validate_session().await);
                }
                Command::SessionInfo { reply } => {
                    let _ = reply.send(self.session.info());
                }
            }
        }
        debug!("gateway worker stopped");
    }

    /// Loads the persisted session once.
    async fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.session = Session::load(&self.store).await;
        self.initialized = true;
        info!(
            base_url = self.http.base_url(),
            authenticated = self.session.is_authenticated(),
            "gateway initialized"
        );
    }

    /// Runs one request under the refresh protocol.
    async fn execute(
        &mut self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, AppyError> {
        if options.skip_auth {
            let response = self.send(path, options, None).await?;
            return finish(response);
        }

        if self.session.is_expiring(now_ms(), self.refresh_buffer_ms) {
            debug!(path, "access token expiring, refreshing before request");
            if let Err(e) = self.refresh().await {
                warn!(path, error = %e, "pre-request refresh failed, continuing without session");
                self.drop_session().await;
            }
        }

        let bearer = self.session.bearer();
        let response = self.send(path, options, bearer.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return finish(response);
        }

        if self.session.refresh_token.is_none() {
            warn!(path, "unauthorized without refresh token, clearing session");
            self.drop_session().await;
            return Err(AppyError::Unauthorized);
        }

        info!(path, "unauthorized, refreshing token and retrying once");
        if let Err(e) = self.refresh().await {
            warn!(path, error = %e, "refresh after 401 failed, clearing session");
            self.drop_session().await;
            return Err(AppyError::Unauthorized);
        }

        let bearer = self.session.bearer();
        let retry = self.send(path, options, bearer.as_deref()).await?;
        if retry.status == StatusCode::UNAUTHORIZED {
            warn!(path, "retry still unauthorized, clearing session");
            self.drop_session().await;
            return Err(AppyError::Unauthorized);
        }
        finish(retry)
    }

    /// One HTTP exchange; rotation headers are applied before returning.
    async fn send(
        &mut self,
        path: &str,
        options: &RequestOptions,
        authorization: Option<&str>,
    ) -> Result<RawResponse, AppyError> {
        let response = self
            .http
            .send(
                options.method.clone(),
                path,
                options.body.as_ref(),
                authorization,
            )
            .await?;
        self.apply_rotation(&response.rotation).await;
        Ok(response)
    }

    async fn apply_rotation(&mut self, rotation: &Rotation) {
        if rotation.is_empty() {
            return;
        }
        if let Some(token) = &rotation.access_token {
            self.session.access_token = Some(SecretString::from(token.clone()));
        }
        if let Some(token) = &rotation.refresh_token {
            self.session.refresh_token = Some(SecretString::from(token.clone()));
        }
        if let Some(expires_in) = rotation.expires_in {
            self.session.expires_at = Some(expiry_from_now(now_ms(), expires_in));
        }
        debug!(
            access = rotation.access_token.is_some(),
            refresh = rotation.refresh_token.is_some(),
            expires_in = ?rotation.expires_in,
            "rotated tokens applied"
        );
        self.session.persist(&self.store).await;
    }

    /// Replaces the token triple and persists it.
    async fn install_tokens(&mut self, tokens: TokenResponse, access_token: String) {
        let expires_at = match (tokens.expires_in, tokens.expires_at) {
            (Some(secs), _) => expiry_from_now(now_ms(), secs),
            (None, Some(at)) => at,
            (None, None) => expiry_from_now(now_ms(), self.default_expires_in_secs),
        };
        self.session.access_token = Some(SecretString::from(access_token));
        if let Some(refresh) = tokens.refresh_token {
            self.session.refresh_token = Some(SecretString::from(refresh));
        }
        self.session.expires_at = Some(expires_at);
        self.session.persist(&self.store).await;
    }

    async fn drop_session(&mut self) {
        // Failures are logged by Session::clear; memory is already cleared.
        let _ = self.session.clear(&self.store).await;
    }

    /// Exchanges the refresh token for a new token triple.
    async fn refresh(&mut self) -> Result<(), AppyError> {
        let refresh_token = match &self.session.refresh_token {
            Some(token) => token.expose_secret().to_owned(),
            None => return Err(AppyError::Unauthorized),
        };

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &refresh_token,
        })
        .map_err(|e| AppyError::decode("refresh request", e))?;

        let response = self
            .http
            .send(Method::POST, endpoints::AUTH_REFRESH, Some(&body), None)
            .await?;

        match response.status.as_u16() {
            401 | 403 => {
                warn!(status = %response.status, "refresh token rejected, clearing session");
                self.drop_session().await;
                return Err(AppyError::RefreshTokenExpired);
            }
            s if !response.status.is_success() => {
                return Err(AppyError::RequestFailed {
                    status: s,
                    message: response.message(),
                });
            }
            _ => {}
        }

        let status = response.status.as_u16();
        let rotation = response.rotation.clone();
        let tokens: TokenResponse = serde_json::from_value(response.body)
            .map_err(|e| AppyError::decode("refresh response", e))?;
        if tokens.success == Some(false) {
            let message = tokens
                .message
                .unwrap_or_else(|| "Token refresh failed".to_string());
            warn!(status, %message, "refresh reported failure");
            return Err(AppyError::RequestFailed { status, message });
        }
        let Some(access_token) = tokens.access_token.clone() else {
            return Err(AppyError::Decode {
                message: "refresh response missing accessToken".to_string(),
                source: None,
            });
        };

        self.install_tokens(tokens, access_token).await;
        self.apply_rotation(&rotation).await;
        info!("access token refreshed");
        Ok(())
    }

    async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AppyError> {
        let body = serde_json::to_value(LoginRequest {
            email,
            password: password.expose_secret(),
        })
        .map_err(|e| AppyError::decode("login request", e))?;

        let response = self
            .http
            .send(Method::POST, endpoints::AUTH_LOGIN, Some(&body), None)
            .await?;

        let status = response.status.as_u16();
        let success = response
            .body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !response.status.is_success() || !success {
            let message = response
                .body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Login failed")
                .to_string();
            warn!(status, "login rejected");
            return Err(AppyError::Login {
                message,
                status: Some(status),
            });
        }

        let tokens: TokenResponse = serde_json::from_value(response.body.clone())
            .map_err(|e| AppyError::decode("login response", e))?;
        let (Some(access_token), Some(_)) = (tokens.access_token.clone(), &tokens.refresh_token)
        else {
            return Err(AppyError::Login {
                message: "invalid login response: missing accessToken or refreshToken"
                    .to_string(),
                status: Some(status),
            });
        };
        self.install_tokens(tokens, access_token).await;
        info!("login succeeded");

        let mut raw = response.body;
        let user = match self
            .execute(endpoints::AUTH_LOGON_USER, &RequestOptions::default())
            .await
        {
            Ok(logon) => logon_user(&logon.body).and_then(|user_value| {
                if let Value::Object(map) = &mut raw {
                    map.insert("user".to_string(), user_value.clone());
                }
                match serde_json::from_value::<User>(user_value) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        warn!(error = %e, "logon user payload did not decode");
                        None
                    }
                }
            }),
            Err(e) => {
                warn!(error = %e, "failed to fetch user after login");
                None
            }
        };

        Ok(LoginOutcome { user, raw })
    }

    async fn logout(&mut self) -> Result<(), AppyError> {
        if self.session.access_token.is_some()
            && let Err(e) = self
                .execute(endpoints::AUTH_LOGOUT, &RequestOptions::default())
                .await
        {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.session
            .clear(&self.store)
            .await
            .map_err(|e| AppyError::Logout {
                message: format!("local session cleared but stored tokens remain: {e}"),
            })?;
        info!("logged out");
        Ok(())
    }

    async fn validate_session(&mut self) -> Option<UserConfig> {
        if !self.session.is_authenticated() {
            return None;
        }
        match self
            .execute(endpoints::AUTH_LOGON_USER, &RequestOptions::default())
            .await
        {
            Ok(response) => {
                let config = logon_user(&response.body)
                    .map(|user| UserConfig {
                        random_position: user
                            .get("randomPosition")
                            .and_then(Value::as_i64)
                            .unwrap_or(UserConfig::default().random_position),
                        full_access: user
                            .get("fullAccess")
                            .and_then(Value::as_i64)
                            .unwrap_or(UserConfig::default().full_access),
                    })
                    .unwrap_or_default();
                Some(config)
            }
            Err(e) => {
                if e.is_auth_failure() || e.status() == Some(400) {
                    self.drop_session().await;
                }
                info!(error = %e, "session validation failed");
                None
            }
        }
    }
}

/// The `user` object of a successful logon user response.
fn logon_user(body: &Value) -> Option<Value> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        return None;
    }
    body.get("user").filter(|u| u.is_object()).cloned()
}

/// Maps a final response to the caller-visible result.
fn finish(response: RawResponse) -> Result<ApiResponse, AppyError> {
    match response.status.as_u16() {
        200..=299 => Ok(ApiResponse {
            status: response.status.as_u16(),
            body: response.body,
        }),
        401 => Err(AppyError::Unauthorized),
        403 => Err(AppyError::Forbidden),
        status => Err(AppyError::RequestFailed {
            status,
            message: response.message(),
        }),
    }
}
