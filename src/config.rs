//! Startup configuration: webhook routing, proxy list, candidate file.
//!
//! All loading here is fail-open. A missing or malformed file is reported
//! once through `tracing::warn!` and the run proceeds with degraded defaults
//! (no proxies, an empty candidate list, or disabled notifications) instead
//! of aborting. The fallible `load` functions return errors so tests can
//! assert on the failure mode; the `*_or_default` wrappers apply the
//! fail-open policy.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::generate::Pattern;
use crate::types::Candidate;

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Webhook target URLs, one per candidate pattern plus one for file mode.
///
/// A missing entry disables notification for that mode rather than failing
/// the run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub five_digits_webhook: Option<String>,
    pub five_letters_webhook: Option<String>,
    pub four_mixed_webhook: Option<String>,
    pub four_letters_webhook: Option<String>,
    pub three_digits_webhook: Option<String>,
    pub file_webhook: Option<String>,
}

impl Config {
    /// Loads the JSON config from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Loads the config, falling back to empty defaults with a single
    /// warning on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load config, continuing without webhooks");
                Self::default()
            }
        }
    }

    /// The webhook target for a generated pattern.
    pub fn webhook_for_pattern(&self, pattern: Pattern) -> Option<&str> {
        let url = match pattern {
            Pattern::FiveDigits => &self.five_digits_webhook,
            Pattern::FiveLetters => &self.five_letters_webhook,
            Pattern::FourMixed => &self.four_mixed_webhook,
            Pattern::FourLetters => &self.four_letters_webhook,
            Pattern::ThreeDigits => &self.three_digits_webhook,
        };
        url.as_deref()
    }

    /// The webhook target for file-sourced runs.
    pub fn webhook_for_file_mode(&self) -> Option<&str> {
        self.file_webhook.as_deref()
    }
}

/// Loads a newline-delimited proxy list.
///
/// Blank lines are skipped; entries lacking a URL scheme are assumed to be
/// plain HTTP proxies and get an `http://` prefix.
pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with("http://") || line.starts_with("https://") {
                line.to_string()
            } else {
                format!("http://{line}")
            }
        })
        .collect())
}

/// Fail-open proxy loading: a missing or unreadable list means no proxies.
pub fn load_proxies_or_default(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match load_proxies(path) {
        Ok(proxies) => {
            if proxies.is_empty() {
                warn!(path = %path.display(), "no proxies loaded, all workers share the default transport");
            }
            proxies
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load proxy list, continuing without proxies");
            Vec::new()
        }
    }
}

/// Loads a newline-delimited candidate file, skipping blank lines.
pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<Candidate>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Candidate::from)
        .collect())
}

/// Fail-open candidate loading: an unreadable file means an empty list.
pub fn load_candidates_or_default(path: impl AsRef<Path>) -> Vec<Candidate> {
    let path = path.as_ref();
    match load_candidates(path) {
        Ok(candidates) => {
            if candidates.is_empty() {
                warn!(path = %path.display(), "no candidates loaded from file");
            }
            candidates
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load candidate file, continuing with empty list");
            Vec::new()
        }
    }
}
