//! Append-only log of available candidates.
//!
//! One candidate per line, created on first append. The file is opened,
//! appended, and closed per write; concurrent appends rely on the
//! filesystem's atomic-append guarantee for short writes rather than an
//! explicit lock. Entry order is completion order, not generation order.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::types::Candidate;

/// Durable sink for candidates that probed as available.
#[derive(Debug, Clone)]
pub struct ValidLog {
    path: PathBuf,
}

impl ValidLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one candidate as a single line.
    pub fn append(&self, candidate: &Candidate) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{candidate}")
    }

    /// Reads all logged candidates, skipping blank lines.
    pub fn entries(&self) -> io::Result<Vec<Candidate>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(Candidate::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn append_creates_file_and_writes_line() {
        let dir = tempdir().unwrap();
        let log = ValidLog::new(dir.path().join("valid.txt"));

        log.append(&Candidate::new("abcde")).unwrap();

        assert_eq!(log.entries().unwrap(), vec![Candidate::new("abcde")]);
    }

    #[test]
    fn appends_accumulate_in_completion_order() {
        let dir = tempdir().unwrap();
        let log = ValidLog::new(dir.path().join("valid.txt"));

        log.append(&Candidate::new("first")).unwrap();
        log.append(&Candidate::new("second")).unwrap();

        assert_eq!(
            log.entries().unwrap(),
            vec![Candidate::new("first"), Candidate::new("second")]
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let log = ValidLog::new(dir.path().join("valid.txt"));
        assert!(log.entries().unwrap().is_empty());
    }
}
