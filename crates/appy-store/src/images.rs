// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped image cache.
//!
//! [`ImageCache::resolve`] maps a remote URL to a local reference. Concurrent
//! callers for the same URL share one fetch: the first caller marks the URL
//! as downloading, later callers poll until the mark is gone and then read
//! the cached entry. Any failure resolves to the original URL.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use appy_config::model::{ImageMode, ImagesConfig};
use appy_core::AppyError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Produces the local reference for a remote image.
#[async_trait]
pub trait ImageFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<String, AppyError>;

    /// Drops everything fetched so far. Called when a new session starts.
    async fn purge(&self) -> Result<(), AppyError> {
        Ok(())
    }
}

/// Resolves every URL to itself; used where the platform loads images lazily.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFetcher;

#[async_trait]
impl ImageFetcher for PassthroughFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppyError> {
        Ok(url.to_string())
    }
}

/// Downloads images into a directory, one file per URL.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    dir: PathBuf,
}

impl HttpImageFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppyError::Network {
                message: format!("failed to build image client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            dir: dir.into(),
        })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

/// File name for a cached URL: SHA-256 of the URL plus its extension.
pub fn cache_file_name(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit_once('/')
        .map_or(path, |(_, last)| last)
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg");
    format!("{digest}.{ext}")
}

fn io_error(e: std::io::Error) -> AppyError {
    AppyError::Storage {
        source: Box::new(e),
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppyError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppyError::Network {
                message: format!("image download failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let bytes = response.bytes().await.map_err(|e| AppyError::Network {
            message: format!("failed to read image body: {e}"),
            source: Some(Box::new(e)),
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;
        let path = self.dir.join(cache_file_name(url));
        tokio::fs::write(&path, &bytes).await.map_err(io_error)?;
        debug!(url, path = %path.display(), bytes = bytes.len(), "image cached");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn purge(&self) -> Result<(), AppyError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, String>,
    downloading: HashSet<String>,
    /// Bumped on every clear so a fetch from the previous session cannot
    /// repopulate the new one.
    generation: u64,
}

enum Claim {
    Hit(String),
    Wait,
    Fetch(u64),
}

/// Clears the downloading mark even if the fetching future is dropped.
///
/// A mark claimed before a `clear` is gone already; the same URL may have
/// been claimed again since, so only a guard of the current generation
/// removes it.
struct InFlight<'a> {
    state: &'a Mutex<CacheState>,
    url: &'a str,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == self.generation {
            state.downloading.remove(self.url);
        }
    }
}

/// Deduplicating URL → local reference memo for the current session.
#[derive(Clone)]
pub struct ImageCache {
    fetcher: Arc<dyn ImageFetcher>,
    state: Arc<Mutex<CacheState>>,
    poll_interval: Duration,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.len())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, poll_interval: Duration) -> Self {
        Self {
            fetcher,
            state: Arc::new(Mutex::new(CacheState::default())),
            poll_interval,
        }
    }

    /// A cache that returns every URL unchanged.
    pub fn passthrough() -> Self {
        Self::new(Arc::new(PassthroughFetcher), Duration::from_millis(100))
    }

    pub fn from_config(config: &ImagesConfig) -> Result<Self, AppyError> {
        let fetcher: Arc<dyn ImageFetcher> = match config.mode {
            ImageMode::Passthrough => Arc::new(PassthroughFetcher),
            ImageMode::Download => Arc::new(HttpImageFetcher::new(&config.cache_dir)?),
        };
        Ok(Self::new(
            fetcher,
            Duration::from_millis(config.poll_interval_ms),
        ))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, url: &str) -> Claim {
        let mut state = self.lock();
        if let Some(hit) = state.entries.get(url) {
            return Claim::Hit(hit.clone());
        }
        if state.downloading.contains(url) {
            return Claim::Wait;
        }
        state.downloading.insert(url.to_string());
        Claim::Fetch(state.generation)
    }

    /// The local reference for `url`, fetching it at most once per session.
    pub async fn resolve(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        let generation = match self.claim(url) {
            Claim::Hit(hit) => return hit,
            Claim::Wait => {
                loop {
                    tokio::time::sleep(self.poll_interval).await;
                    if !self.lock().downloading.contains(url) {
                        break;
                    }
                }
                return self.cached(url).unwrap_or_else(|| url.to_string());
            }
            Claim::Fetch(generation) => generation,
        };

        let _in_flight = InFlight {
            state: &self.state,
            url,
            generation,
        };
        match self.fetcher.fetch(url).await {
            Ok(local) => {
                let mut state = self.lock();
                if state.generation == generation {
                    state.entries.insert(url.to_string(), local.clone());
                }
                local
            }
            Err(e) => {
                warn!(url, error = %e, "image fetch failed, using original url");
                url.to_string()
            }
        }
    }

    /// The cached reference for `url`, without fetching.
    pub fn cached(&self, url: &str) -> Option<String> {
        self.lock().entries.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every entry and in-flight mark and purges fetched files.
    pub async fn clear(&self) {
        {
            let mut state = self.lock();
            state.entries.clear();
            state.downloading.clear();
            state.generation += 1;
        }
        if let Err(e) = self.fetcher.purge().await {
            warn!(error = %e, "failed to purge image cache");
        }
    }
}
