// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment reports a rejected key with the serde field list of whatever
//! struct refused it. This module maps each error back onto the layout of
//! `appy.toml`: the section it sits in, the closest key that section
//! accepts, the section a misplaced key belongs to, and the `APPY_*`
//! variable when the value came from the environment.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Sections of `appy.toml` and the keys each one accepts.
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("client", &["name", "log_level"]),
    (
        "api",
        &[
            "base_url",
            "request_timeout_secs",
            "refresh_buffer_secs",
            "default_expires_in_secs",
        ],
    ),
    ("storage", &["backend", "token_db_path"]),
    ("images", &["mode", "cache_dir", "poll_interval_ms"]),
    (
        "freshness",
        &["stale_after_minutes", "background_threshold_minutes"],
    ),
];

/// Keys accepted by `section`.
pub fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
}

/// The section other than `except` that owns `key`.
fn owning_section(key: &str, except: Option<&str>) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(name, keys)| Some(*name) != except && keys.contains(&key))
        .map(|(name, _)| *name)
}

/// Where a rejected value was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(String),
    Env,
    Unknown,
}

impl Origin {
    fn of(error: &FigmentError) -> Self {
        let Some(metadata) = error.metadata.as_ref() else {
            return Origin::Unknown;
        };
        match &metadata.source {
            Some(figment::Source::File(path)) => Origin::File(path.display().to_string()),
            _ if metadata.name.contains("environment") => Origin::Env,
            _ => Origin::Unknown,
        }
    }
}

/// The variable that sets `section.key`.
pub fn env_var(section: Option<&str>, key: &str) -> String {
    match section {
        Some(section) => format!("APPY_{}_{}", section, key).to_uppercase(),
        None => format!("APPY_{key}").to_uppercase(),
    }
}

/// A configuration problem, rendered through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A top-level name that is not one of the sections.
    #[error("unknown section `{name}`")]
    #[diagnostic(
        code(appy::config::unknown_section),
        help("{}", section_help(name, suggestion.as_deref(), *belongs_in, origin))
    )]
    UnknownSection {
        name: String,
        suggestion: Option<String>,
        /// The section that owns `name` when it is a key, not a section.
        belongs_in: Option<&'static str>,
        origin: Origin,
        #[label("not a section of appy.toml")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key the section does not accept.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(appy::config::unknown_key),
        help("{}", key_help(section, key, suggestion.as_deref(), *belongs_in, origin))
    )]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        /// Set when another section accepts `key`.
        belongs_in: Option<&'static str>,
        origin: Origin,
        #[label("not accepted here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// An enum-valued key set to something it does not accept.
    #[error("`{key}` cannot be `{value}`")]
    #[diagnostic(
        code(appy::config::unknown_variant),
        help("{}", variant_help(suggestion.as_deref(), expected))
    )]
    UnknownVariant {
        key: String,
        value: String,
        expected: String,
        suggestion: Option<String>,
        #[label("unsupported value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(appy::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A semantic problem found after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(appy::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(appy::config::other))]
    Other(String),
}

fn section_help(
    name: &str,
    suggestion: Option<&str>,
    belongs_in: Option<&str>,
    origin: &Origin,
) -> String {
    let mut help = match (belongs_in, suggestion) {
        (Some(section), _) => format!("`{name}` is a key of [{section}]; move it under that header"),
        (None, Some(s)) => format!("did you mean [{s}]?"),
        (None, None) => {
            let names: Vec<&str> = SECTIONS.iter().map(|(n, _)| *n).collect();
            format!("sections: {}", names.join(", "))
        }
    };
    if *origin == Origin::Env {
        help.push_str(&format!(" (set by {})", env_var(None, name)));
    }
    help
}

fn key_help(
    section: &str,
    key: &str,
    suggestion: Option<&str>,
    belongs_in: Option<&str>,
    origin: &Origin,
) -> String {
    let mut lines = Vec::new();
    if let Some(other) = belongs_in {
        lines.push(format!("`{key}` belongs in [{other}]"));
    } else if let Some(s) = suggestion {
        lines.push(format!("did you mean `{s}`?"));
    }
    if let Some(keys) = section_keys(section) {
        lines.push(format!("[{section}] accepts: {}", keys.join(", ")));
    }
    if *origin == Origin::Env {
        lines.push(format!("set by {}", env_var(Some(section), key)));
    }
    lines.join("\n")
}

fn variant_help(suggestion: Option<&str>, expected: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? expected one of: {expected}"),
        None => format!("expected one of: {expected}"),
    }
}

/// Convert a `figment::Error` into one `ConfigError` per reported problem.
///
/// `toml_sources` holds `(path, content)` pairs used to point at the
/// offending line.
pub fn figment_to_config_errors(
    err: FigmentError,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &FigmentError, toml_sources: &[(String, String)]) -> ConfigError {
    let origin = Origin::of(error);
    let path: Vec<&str> = error.path.iter().map(String::as_str).collect();

    match &error.kind {
        Kind::UnknownField(field, expected) => match path.first().copied() {
            None => {
                let belongs_in = owning_section(field, None);
                let names: Vec<&str> = SECTIONS.iter().map(|(n, _)| *n).collect();
                let suggestion = belongs_in
                    .is_none()
                    .then(|| suggest_key(field, &names))
                    .flatten();
                let (span, src) = locate(&origin, toml_sources, |content| {
                    find_section_header(content, field).or_else(|| find_key(content, None, field))
                });
                ConfigError::UnknownSection {
                    name: field.clone(),
                    suggestion,
                    belongs_in,
                    origin,
                    span,
                    src,
                }
            }
            Some(section) => {
                let belongs_in = owning_section(field, Some(section));
                let valid = section_keys(section).unwrap_or(*expected);
                let suggestion = belongs_in
                    .is_none()
                    .then(|| suggest_key(field, valid))
                    .flatten();
                let (span, src) = locate(&origin, toml_sources, |content| {
                    find_key(content, Some(section), field)
                });
                ConfigError::UnknownKey {
                    section: section.to_string(),
                    key: field.clone(),
                    suggestion,
                    belongs_in,
                    origin,
                    span,
                    src,
                }
            }
        },
        Kind::UnknownVariant(value, expected) => {
            let (span, src) = locate_value(&origin, toml_sources, &path);
            ConfigError::UnknownVariant {
                key: path.join("."),
                value: value.clone(),
                expected: expected.join(", "),
                suggestion: suggest_key(value, expected),
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) => {
            let (span, src) = locate_value(&origin, toml_sources, &path);
            ConfigError::InvalidType {
                key: path.join("."),
                found: actual.to_string(),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Span of the key named by a full `section.key` path.
fn locate_value(
    origin: &Origin,
    toml_sources: &[(String, String)],
    path: &[&str],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    match path {
        &[section, key] => locate(origin, toml_sources, |content| {
            find_key(content, Some(section), key)
        }),
        _ => (None, None),
    }
}

/// Runs `find` over the source the error came from.
///
/// A single source with no recorded origin (an inline string) is searched
/// too. Values from the environment have no source text.
fn locate(
    origin: &Origin,
    toml_sources: &[(String, String)],
    find: impl Fn(&str) -> Option<SourceSpan>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source = match origin {
        Origin::File(path) => toml_sources.iter().find(|(p, _)| p == path),
        Origin::Unknown if toml_sources.len() == 1 => toml_sources.first(),
        _ => None,
    };
    source
        .and_then(|(path, content)| {
            find(content).map(|span| (Some(span), Some(NamedSource::new(path, content.clone()))))
        })
        .unwrap_or((None, None))
}

/// Byte offsets of each line's start, with the line itself.
fn lines_with_offsets(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line.trim_end_matches(['\n', '\r'])))
    })
}

/// Table name of a `[header]` line.
fn header_name(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix('[')?;
    if inner.starts_with('[') {
        return None;
    }
    let end = inner.find(']')?;
    Some(inner[..end].trim())
}

/// Span of `name` inside its `[name]` header.
pub fn find_section_header(content: &str, name: &str) -> Option<SourceSpan> {
    lines_with_offsets(content).find_map(|(start, line)| {
        (header_name(line) == Some(name)).then(|| {
            let column = line.find(name).unwrap_or(0);
            SourceSpan::new((start + column).into(), name.len())
        })
    })
}

/// Span of `key` assigned inside `section` (`None` for the top level).
///
/// Only lines between the section's header and the next header count.
pub fn find_key(content: &str, section: Option<&str>, key: &str) -> Option<SourceSpan> {
    let mut current: Option<&str> = None;
    for (start, line) in lines_with_offsets(content) {
        if let Some(name) = header_name(line) {
            current = Some(name);
            continue;
        }
        if current != section {
            continue;
        }
        let trimmed = line.trim_start();
        let assigns = trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns {
            let column = line.len() - trimmed.len();
            return Some(SourceSpan::new((start + column).into(), key.len()));
        }
    }
    None
}

/// The closest candidate to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Render every error to stderr, preceded by a count.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    match errors.len() {
        0 => return,
        1 => eprintln!("appy: invalid configuration"),
        n => eprintln!("appy: {n} configuration problems"),
    }
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("  {error}"),
        }
    }
}
