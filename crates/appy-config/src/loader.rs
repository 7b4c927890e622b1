// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./appy.toml` > `~/.config/appy/appy.toml` > `/etc/appy/appy.toml`
//! with environment variable overrides via `APPY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AppyConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/appy/appy.toml";
pub(crate) const LOCAL_CONFIG: &str = "appy.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/appy/appy.toml`
/// 3. `~/.config/appy/appy.toml`
/// 4. `./appy.toml`
/// 5. `APPY_*` environment variables
pub fn load_config() -> Result<AppyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<AppyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AppyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AppyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AppyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard hierarchy.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AppyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("appy/appy.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that
/// `APPY_API_REFRESH_BUFFER_SECS` maps to `api.refresh_buffer_secs`.
/// `APPY_PASSWORD` is a login credential, not configuration.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("APPY_").ignore(&["password"]).map(|key| {
        let mapped = key
            .as_str()
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("images_", "images.", 1)
            .replacen("freshness_", "freshness.", 1);
        mapped.into()
    })
}
