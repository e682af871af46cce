//! # Fibonacci backoff for reconnect attempts.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated failures.
//! It is parameterized by:
//! - [`BackoffPolicy::unit`] the length of one Fibonacci step;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay after failed attempt `n` (1-based) is `fib(n) × unit`, clamped to
//! `max`, with the sequence seeded at `(0, 1)`. With the defaults this yields
//! `1s, 1s, 2s, 3s, 5s, 8s, 13s, 21s, 30s, 30s, ...`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use syncvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::default();
//!
//! assert_eq!(backoff.delay(1), Duration::from_secs(1));
//! assert_eq!(backoff.delay(5), Duration::from_secs(5));
//! assert_eq!(backoff.delay(9), Duration::from_secs(30));
//! ```

use std::time::Duration;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Duration of one Fibonacci step.
    pub unit: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `unit = 1s`;
    /// - `max = 30s`.
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay following failed attempt `attempt` (1-based).
    ///
    /// `attempt = 0` is treated as the first attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let mut seq = self.iter();
        let mut delay = self.unit.min(self.max);
        for _ in 0..attempt.max(1) {
            delay = seq.next().unwrap_or(self.max);
            if delay >= self.max {
                break;
            }
        }
        delay
    }

    /// Returns the delay sequence, starting from the first failed attempt.
    pub fn iter(&self) -> Fibonacci {
        Fibonacci {
            a: 0,
            b: 1,
            unit: self.unit,
            max: self.max,
        }
    }
}

/// Infinite, capped Fibonacci delay sequence.
///
/// Only the two running terms are kept; once the cap is reached the terms stop
/// advancing. The step count is never truncated, so any non-zero `unit`
/// eventually reaches `max`.
#[derive(Clone, Debug)]
pub struct Fibonacci {
    a: u64,
    b: u64,
    unit: Duration,
    max: Duration,
}

impl Iterator for Fibonacci {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = scaled(self.unit, self.b).min(self.max);

        if delay < self.max {
            let next = self.a.saturating_add(self.b);
            self.a = self.b;
            self.b = next;
        }
        Some(delay)
    }
}

/// `unit × steps`, saturating at `Duration::MAX`.
fn scaled(unit: Duration, steps: u64) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let nanos = unit.as_nanos().saturating_mul(u128::from(steps));
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(v: &[u64]) -> Vec<Duration> {
        v.iter().copied().map(Duration::from_secs).collect()
    }

    #[test]
    fn test_default_sequence_caps_at_thirty() {
        let got: Vec<_> = BackoffPolicy::default().iter().take(12).collect();
        assert_eq!(got, secs(&[1, 1, 2, 3, 5, 8, 13, 21, 30, 30, 30, 30]));
    }

    #[test]
    fn test_delay_matches_iterator() {
        let policy = BackoffPolicy::default();
        for (i, expected) in policy.iter().take(20).enumerate() {
            assert_eq!(policy.delay(i as u32 + 1), expected, "attempt {}", i + 1);
        }
    }

    #[test]
    fn test_attempt_zero_behaves_like_first() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
    }

    #[test]
    fn test_custom_unit() {
        let policy = BackoffPolicy {
            unit: Duration::from_millis(100),
            max: Duration::from_millis(450),
        };
        let got: Vec<_> = policy.iter().take(7).collect();
        let expected: Vec<_> = [100, 100, 200, 300, 450, 450, 450]
            .into_iter()
            .map(Duration::from_millis)
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_huge_attempt_clamps_to_max() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(10_000), Duration::from_secs(30));
    }

    #[test]
    fn test_max_below_unit() {
        let policy = BackoffPolicy {
            unit: Duration::from_secs(10),
            max: Duration::from_secs(5),
        };
        assert_eq!(policy.delay(1), Duration::from_secs(5));
        assert_eq!(policy.delay(3), Duration::from_secs(5));
    }

    #[test]
    fn test_tiny_unit_still_reaches_cap() {
        let policy = BackoffPolicy {
            unit: Duration::from_nanos(1),
            max: Duration::from_secs(30),
        };
        let mut seq = policy.iter();
        let last = seq.by_ref().take(200).last();
        assert_eq!(last, Some(Duration::from_secs(30)));
        assert_eq!(seq.next(), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay(200), Duration::from_secs(30));
    }

    #[test]
    fn test_huge_unit_saturates_to_max() {
        let policy = BackoffPolicy {
            unit: Duration::MAX,
            max: Duration::from_secs(30),
        };
        assert_eq!(policy.iter().nth(5), Some(Duration::from_secs(30)));
    }
}
