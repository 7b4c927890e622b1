// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{AppyConfig, ImageMode, StorageBackend};

/// Upper bound for the freshness windows: one year.
pub const MAX_FRESHNESS_MINUTES: u64 = 365 * 24 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &AppyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.cannot_be_a_base() {
                errors.push(validation(format!(
                    "api.base_url `{}` cannot be used as a base URL",
                    config.api.base_url
                )));
            }
        }
        Ok(url) => errors.push(validation(format!(
            "api.base_url must use http or https, got `{}`",
            url.scheme()
        ))),
        Err(e) => errors.push(validation(format!(
            "api.base_url `{}` is not a valid URL: {e}",
            config.api.base_url
        ))),
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(validation(
            "api.request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.api.default_expires_in_secs == 0 {
        errors.push(validation(
            "api.default_expires_in_secs must be greater than 0".to_string(),
        ));
    }

    if config.api.refresh_buffer_secs >= config.api.default_expires_in_secs {
        errors.push(validation(format!(
            "api.refresh_buffer_secs ({}) must be smaller than api.default_expires_in_secs ({})",
            config.api.refresh_buffer_secs, config.api.default_expires_in_secs
        )));
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.token_db_path.trim().is_empty()
    {
        errors.push(validation(
            "storage.token_db_path must not be empty when backend = \"sqlite\"".to_string(),
        ));
    }

    if config.images.mode == ImageMode::Download && config.images.cache_dir.trim().is_empty() {
        errors.push(validation(
            "images.cache_dir must not be empty when mode = \"download\"".to_string(),
        ));
    }

    if config.images.poll_interval_ms == 0 {
        errors.push(validation(
            "images.poll_interval_ms must be greater than 0".to_string(),
        ));
    }

    if config.freshness.stale_after_minutes == 0 {
        errors.push(validation(
            "freshness.stale_after_minutes must be greater than 0".to_string(),
        ));
    }

    for (key, minutes) in [
        ("stale_after_minutes", config.freshness.stale_after_minutes),
        (
            "background_threshold_minutes",
            config.freshness.background_threshold_minutes,
        ),
    ] {
        if minutes > MAX_FRESHNESS_MINUTES {
            errors.push(validation(format!(
                "freshness.{key} ({minutes}) must be at most {MAX_FRESHNESS_MINUTES}"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validation(message: String) -> ConfigError {
    ConfigError::Validation { message }
}
