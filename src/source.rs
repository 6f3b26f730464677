//! Where candidates come from: pattern generation or a fixed list.
//!
//! A generated source is unbounded and runs until shutdown; a list source is
//! finite and the run ends when the list is exhausted.

use std::fmt;

use crate::generate::Pattern;
use crate::types::Candidate;

/// The candidate supply for a run.
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// Endless stream drawn from a generation pattern.
    Generated(Pattern),
    /// Fixed list loaded from a file, consumed exactly once.
    List(Vec<Candidate>),
}

impl CandidateSource {
    /// Whether the run ends on its own once the supply is exhausted.
    pub fn is_finite(&self) -> bool {
        matches!(self, CandidateSource::List(_))
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Generated(pattern) => write!(f, "generated ({pattern:?})"),
            CandidateSource::List(candidates) => {
                write!(f, "file list ({} candidates)", candidates.len())
            }
        }
    }
}
