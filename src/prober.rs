//! One classified, retried oracle query per admitted candidate.
//!
//! The prober owns the retry loop and the per-candidate side effects.
//! Exactly one `probe` call happens per admitted candidate; each call
//! increments `checked` exactly once regardless of outcome, and an
//! Available outcome additionally appends to the valid log, enqueues a
//! notification, and increments `valid` — in that order.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::metrics::Metrics;
use crate::notify::NotifierHandle;
use crate::oracle::OracleClient;
use crate::retry::ProbeBackoff;
use crate::sink::ValidLog;
use crate::types::{Candidate, Outcome};

/// Probes candidates against the oracle and applies outcome side effects.
///
/// One prober exists per worker, wrapping the transport that worker was
/// bound to; the metrics, log, and notifier handle are shared across the
/// pool.
pub struct Prober<O> {
    oracle: O,
    backoff: ProbeBackoff,
    metrics: Arc<Metrics>,
    log: ValidLog,
    notifier: NotifierHandle,
}

impl<O: OracleClient> Prober<O> {
    pub fn new(
        oracle: O,
        metrics: Arc<Metrics>,
        log: ValidLog,
        notifier: NotifierHandle,
    ) -> Self {
        Self {
            oracle,
            backoff: ProbeBackoff::DEFAULT,
            metrics,
            log,
            notifier,
        }
    }

    /// Overrides the retry schedule (tests use a millisecond base).
    pub fn with_backoff(mut self, backoff: ProbeBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Probes one candidate and applies all side effects.
    pub async fn probe(&self, candidate: &Candidate) -> Outcome {
        let outcome = self.classify(candidate).await;

        self.metrics.record_checked();

        if outcome == Outcome::Available {
            // A failed append must not take the worker down or suppress
            // the notification.
            if let Err(err) = self.log.append(candidate) {
                warn!(%candidate, error = %err, "failed to append to valid log");
            }
            self.notifier.notify(candidate.clone());
        }

        self.metrics.record_outcome(outcome);
        outcome
    }

    /// Runs the retried query and maps the reply to an outcome.
    ///
    /// Retryable failures (transport, non-success status) back off
    /// exponentially after every failed attempt; a response that arrived
    /// but cannot be decoded is terminal.
    async fn classify(&self, candidate: &Candidate) -> Outcome {
        for attempt in 0..self.backoff.max_attempts {
            match self.oracle.query(candidate).await {
                Ok(reply) => return Outcome::from_code(reply.code),
                Err(err) if err.is_retryable() => {
                    trace!(%candidate, attempt, error = %err, "probe attempt failed");
                    tokio::time::sleep(self.backoff.delay_after(attempt)).await;
                }
                Err(err) => {
                    trace!(%candidate, attempt, error = %err, "undecodable oracle response");
                    return Outcome::Error;
                }
            }
        }
        Outcome::Error
    }
}
