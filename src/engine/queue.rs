//! Shared work queue for file-sourced runs.
//!
//! The queue is filled once at startup and only drained afterwards; `pop`
//! returning `None` means the run is over for that worker. Each candidate is
//! handed to exactly one popper.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::types::Candidate;

/// FIFO queue of candidates awaiting a probe.
#[derive(Debug)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Candidate>>,
}

impl JobQueue {
    /// Creates a queue pre-filled with the run's entire candidate list.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            jobs: Mutex::new(candidates.into()),
        }
    }

    /// Takes the next candidate, or `None` once the queue is drained.
    pub fn pop(&self) -> Option<Candidate> {
        self.jobs.lock().expect("job queue lock poisoned").pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().expect("job queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn pops_in_fifo_order_then_none() {
        let queue = JobQueue::new(vec![Candidate::new("a"), Candidate::new("b")]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(Candidate::new("a")));
        assert_eq!(queue.pop(), Some(Candidate::new("b")));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_pops_none() {
        let queue = JobQueue::new(Vec::new());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn concurrent_poppers_each_take_distinct_candidates() {
        let total = 200usize;
        let candidates: Vec<_> = (0..total)
            .map(|i| Candidate::new(format!("cand-{i}")))
            .collect();
        let queue = Arc::new(JobQueue::new(candidates));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(candidate) = queue.pop() {
                        taken.push(candidate);
                    }
                    taken
                })
            })
            .collect();

        let mut all: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all.dedup();

        // Every candidate was handed out exactly once.
        assert_eq!(all.len(), total);
        assert!(queue.is_empty());
    }
}
