//! At-most-once admission gate for candidates.
//!
//! Every candidate must pass through [`DedupGate::admit`] before it may be
//! probed. The gate owns the seen-set exclusively; nothing else in the
//! process can observe or mutate it. The set grows monotonically and is not
//! persisted across restarts.
//!
//! # Concurrency
//!
//! The membership test and insert happen inside a single critical section,
//! so among any number of concurrent callers racing on the same candidate,
//! exactly one observes `true`. The critical section is deliberately short
//! (hash + insert) and the lock is a plain `std::sync::Mutex`; workers never
//! hold it across an await point.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::types::Candidate;

/// Shared gate ensuring each candidate is dispatched for probing at most once.
#[derive(Debug, Default)]
pub struct DedupGate {
    seen: Mutex<HashSet<String>>,
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a candidate the first time it is seen.
    ///
    /// Returns `true` exactly once per distinct candidate value, `false` on
    /// every subsequent call including concurrent racers.
    pub fn admit(&self, candidate: &Candidate) -> bool {
        let mut seen = self.seen.lock().expect("dedup lock poisoned");
        seen.insert(candidate.as_str().to_owned())
    }

    /// Number of distinct candidates ever admitted.
    pub fn len(&self) -> usize {
        self.seen.lock().expect("dedup lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_call_admits_second_rejects() {
        let gate = DedupGate::new();
        let c = Candidate::new("abcde");
        assert!(gate.admit(&c));
        assert!(!gate.admit(&c));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn distinct_candidates_are_independent() {
        let gate = DedupGate::new();
        assert!(gate.admit(&Candidate::new("aaa")));
        assert!(gate.admit(&Candidate::new("bbb")));
        assert!(!gate.admit(&Candidate::new("aaa")));
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn concurrent_racers_admit_exactly_once() {
        let gate = Arc::new(DedupGate::new());
        let threads = 16;
        let rounds = 100;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    let mut admitted = 0usize;
                    for i in 0..rounds {
                        let c = Candidate::new(format!("cand-{i}"));
                        if gate.admit(&c) {
                            admitted += 1;
                        }
                    }
                    admitted
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // Each of the `rounds` distinct values is admitted exactly once
        // across all racing threads.
        assert_eq!(total, rounds);
        assert_eq!(gate.len(), rounds);
    }

    proptest! {
        /// Admission count always equals the number of distinct values.
        #[test]
        fn prop_admissions_equal_distinct_values(values in proptest::collection::vec("[a-z0-9]{1,8}", 0..50)) {
            let gate = DedupGate::new();
            let mut admitted = 0usize;
            for v in &values {
                if gate.admit(&Candidate::new(v.clone())) {
                    admitted += 1;
                }
            }
            let distinct: HashSet<_> = values.iter().collect();
            prop_assert_eq!(admitted, distinct.len());
            prop_assert_eq!(gate.len(), distinct.len());
        }
    }
}
