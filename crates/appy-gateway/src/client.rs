// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the Appy backend.
//!
//! [`HttpClient`] only builds URLs, attaches headers and decodes bodies.
//! Token lifecycle and retry policy live in the worker.

use std::time::Duration;

use appy_config::model::ApiConfig;
use appy_core::AppyError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

pub(crate) const HEADER_ACCESS_TOKEN: &str = "x-access-token";
pub(crate) const HEADER_REFRESH_TOKEN: &str = "x-refresh-token";
pub(crate) const HEADER_EXPIRES_IN: &str = "x-expires-in";

/// Token rotation carried on response headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Rotation {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl Rotation {
    fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            access_token: text(HEADER_ACCESS_TOKEN),
            refresh_token: text(HEADER_REFRESH_TOKEN),
            expires_in: text(HEADER_EXPIRES_IN).and_then(|v| v.parse().ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_in.is_none()
    }
}

/// Status, rotation headers and decoded body of one HTTP exchange.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub rotation: Rotation,
    /// JSON body; a non-JSON body is kept as a string, an empty one as null.
    pub body: Value,
}

impl RawResponse {
    /// Human-readable error message from a `{ message }` or `{ error }` body.
    pub fn message(&self) -> String {
        self.body
            .get("message")
            .or_else(|| self.body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.body.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Request failed: {}", self.status.as_u16()))
    }
}

/// Thin wrapper over a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Builds the client with JSON default headers and the configured timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, AppyError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppyError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute paths are used verbatim; relative ones are joined onto the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authorization: Option<&str>,
    ) -> Result<RawResponse, AppyError> {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| AppyError::Network {
            message: format!("{method} {path} failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        let rotation = Rotation::from_headers(response.headers());
        let text = response.text().await.map_err(|e| AppyError::Network {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(%method, path, status = %status, bytes = text.len(), "response received");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(RawResponse {
            status,
            rotation,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> HttpClient {
        HttpClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn url_joins_relative_paths() {
        let c = client("https://api.example.com/v2");
        assert_eq!(c.base_url(), "https://api.example.com/v2/");
        assert_eq!(c.url("api/app/ranking"), "https://api.example.com/v2/api/app/ranking");
        assert_eq!(c.url("/api/auth/login"), "https://api.example.com/v2/api/auth/login");
        assert_eq!(c.url("https://cdn.example.com/x"), "https://cdn.example.com/x");
    }

    #[tokio::test]
    async fn send_decodes_json_and_rotation_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/app/ranking"))
            .and(header("authorization", "Bearer abc"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Access-Token", "rotated")
                    .insert_header("X-Expires-In", "120")
                    .set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let c = client(&server.uri());
        let body = serde_json::json!({"type": "points"});
        let resp = c
            .send(Method::POST, "api/app/ranking", Some(&body), Some("Bearer abc"))
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["success"], true);
        assert_eq!(resp.rotation.access_token.as_deref(), Some("rotated"));
        assert_eq!(resp.rotation.expires_in, Some(120));
        assert!(resp.rotation.refresh_token.is_none());
    }

    #[tokio::test]
    async fn non_json_body_is_kept_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let resp = client(&server.uri())
            .send(Method::GET, "anything", None, None)
            .await
            .unwrap();
        assert_eq!(resp.status.as_u16(), 502);
        assert_eq!(resp.message(), "bad gateway");
        assert!(resp.rotation.is_empty());
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let c = client("http://127.0.0.1:9/");
        let err = c.send(Method::GET, "x", None, None).await.unwrap_err();
        assert!(matches!(err, AppyError::Network { .. }), "got {err:?}");
    }
}
