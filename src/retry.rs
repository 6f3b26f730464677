//! Backoff schedules for the probe and notification retry loops.
//!
//! Delay computation is a pure function of the attempt index (probe path) or
//! of the prior attempt's failure (notification path), decoupled from the
//! actual sleep. Tests drive these schedules on tokio's paused clock and
//! never wait on the wall clock.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff for oracle probe attempts.
///
/// Attempt `i` (0-indexed) is followed on failure by a wait of
/// `base * 2^i`: with the 1-second production base that is 1s, 2s, 4s.
#[derive(Debug, Clone, Copy)]
pub struct ProbeBackoff {
    /// Total attempts made before giving up.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles each attempt.
    pub base_delay: Duration,
}

impl ProbeBackoff {
    /// Production schedule: 3 attempts, 1s/2s/4s waits.
    pub const DEFAULT: Self = Self {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
    };

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after the given failed attempt (0-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// All delays in order, one per attempt.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts).map(|attempt| self.delay_after(attempt))
    }
}

impl Default for ProbeBackoff {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How a single webhook delivery attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Request construction or transport failure before any response.
    Transport,
    /// HTTP 429 with an optional parsed `Retry-After` value in seconds.
    RateLimited { retry_after: Option<u64> },
    /// Any other non-success HTTP status.
    Status(u16),
}

/// Delay policy for notification delivery attempts.
///
/// Transport failures wait a randomized 200–500ms, non-success statuses a
/// randomized 300–600ms, and rate-limit signals honor `Retry-After` (seconds)
/// with a fixed 3s fallback when the header is absent or unparsable.
#[derive(Debug, Clone, Copy)]
pub struct PublishBackoff {
    pub transport_floor: Duration,
    pub transport_spread_ms: u64,
    pub status_floor: Duration,
    pub status_spread_ms: u64,
    pub rate_limit_fallback: Duration,
}

impl PublishBackoff {
    pub const DEFAULT: Self = Self {
        transport_floor: Duration::from_millis(200),
        transport_spread_ms: 300,
        status_floor: Duration::from_millis(300),
        status_spread_ms: 300,
        rate_limit_fallback: Duration::from_secs(3),
    };

    /// Computes the wait before the next attempt for the given failure.
    pub fn delay_for(&self, failure: AttemptFailure, rng: &mut impl Rng) -> Duration {
        match failure {
            AttemptFailure::Transport => {
                self.transport_floor + Duration::from_millis(rng.gen_range(0..self.transport_spread_ms))
            }
            AttemptFailure::RateLimited { retry_after } => retry_after
                .map(Duration::from_secs)
                .unwrap_or(self.rate_limit_fallback),
            AttemptFailure::Status(_) => {
                self.status_floor + Duration::from_millis(rng.gen_range(0..self.status_spread_ms))
            }
        }
    }
}

impl Default for PublishBackoff {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn probe_default_delays_are_1_2_4() {
        let backoff = ProbeBackoff::DEFAULT;
        let delays: Vec<_> = backoff.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn probe_base_scales_schedule() {
        let backoff = ProbeBackoff::new(3, Duration::from_millis(10));
        assert_eq!(backoff.delay_after(0), Duration::from_millis(10));
        assert_eq!(backoff.delay_after(1), Duration::from_millis(20));
        assert_eq!(backoff.delay_after(2), Duration::from_millis(40));
    }

    #[test]
    fn rate_limit_honors_retry_after() {
        let backoff = PublishBackoff::DEFAULT;
        let mut rng = rand::thread_rng();
        let delay = backoff.delay_for(
            AttemptFailure::RateLimited {
                retry_after: Some(5),
            },
            &mut rng,
        );
        assert_eq!(delay, Duration::from_secs(5));
    }

    #[test]
    fn rate_limit_without_header_uses_fixed_fallback() {
        let backoff = PublishBackoff::DEFAULT;
        let mut rng = rand::thread_rng();
        let delay = backoff.delay_for(AttemptFailure::RateLimited { retry_after: None }, &mut rng);
        assert_eq!(delay, Duration::from_secs(3));
    }

    proptest! {
        /// Transport waits always land in the 200–500ms window.
        #[test]
        fn prop_transport_delay_in_window(seed in any::<u64>()) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let delay = PublishBackoff::DEFAULT.delay_for(AttemptFailure::Transport, &mut rng);
            prop_assert!(delay >= Duration::from_millis(200));
            prop_assert!(delay < Duration::from_millis(500));
        }

        /// Non-success status waits always land in the 300–600ms window.
        #[test]
        fn prop_status_delay_in_window(seed in any::<u64>(), status in 300u16..600) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let delay = PublishBackoff::DEFAULT.delay_for(AttemptFailure::Status(status), &mut rng);
            prop_assert!(delay >= Duration::from_millis(300));
            prop_assert!(delay < Duration::from_millis(600));
        }

        /// The probe schedule is strictly doubling for any base.
        #[test]
        fn prop_probe_delays_double(base_ms in 1u64..1000, attempts in 1u32..8) {
            let backoff = ProbeBackoff::new(attempts, Duration::from_millis(base_ms));
            let delays: Vec<_> = backoff.delays().collect();
            for window in delays.windows(2) {
                prop_assert_eq!(window[1], window[0] * 2);
            }
        }
    }
}
