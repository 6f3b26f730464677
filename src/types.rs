//! Core domain types shared across the probing pipeline.
//!
//! `Candidate` is a newtype over the identifier string so that raw strings
//! cannot be accidentally fed into the prober without passing through a
//! source, and `Outcome` is the four-way classification every probed
//! candidate resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate identifier, either generated or loaded from a file.
///
/// Immutable once produced; the same value is used for dedup admission,
/// the oracle query, the valid log entry, and the webhook message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(pub String);

impl Candidate {
    pub fn new(s: impl Into<String>) -> Self {
        Candidate(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Candidate {
    fn from(s: String) -> Self {
        Candidate(s)
    }
}

impl From<&str> for Candidate {
    fn from(s: &str) -> Self {
        Candidate(s.to_string())
    }
}

/// The classification of a single probe.
///
/// Produced exactly once per admitted candidate. `Error` covers transport
/// exhaustion, undecodable responses, and unknown status codes; it has no
/// dedicated counter and is visible only as `checked` minus the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The identifier is available for registration.
    Available,
    /// The identifier is already taken.
    Taken,
    /// The identifier is rejected by the oracle's content filter.
    Censored,
    /// The probe could not be classified.
    Error,
}

impl Outcome {
    /// Maps the oracle's integer status code to an outcome.
    ///
    /// Any code outside the documented set is treated as `Error` rather
    /// than rejected, so an oracle-side extension cannot wedge a worker.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Outcome::Available,
            1 => Outcome::Taken,
            2 => Outcome::Censored,
            _ => Outcome::Error,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Available => "available",
            Outcome::Taken => "taken",
            Outcome::Censored => "censored",
            Outcome::Error => "error",
        };
        write!(f, "{s}")
    }
}
