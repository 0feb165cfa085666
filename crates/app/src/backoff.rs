//! Reconnect backoff policy.

use std::time::Duration;

/// Exponential backoff between event stream reconnects.
///
/// `delay(n) = min(initial_delay * multiplier^n * (1 + jitter * sin(7.3 n)), max_delay)`
///
/// The jitter is a deterministic function of the attempt number. It breaks
/// the lockstep of a plain geometric series and is reproducible in tests,
/// but every client computes the same delay for the same attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first reconnect. Default: 1s.
    pub initial_delay: Duration,
    /// Growth factor between attempts. Default: 2.
    pub multiplier: f64,
    /// Upper bound on any delay. Default: 60s.
    pub max_delay: Duration,
    /// Relative jitter amplitude in `[0, 1]`. Default: 0.25.
    pub jitter: f64,
    /// Attempts before giving up; `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: 0.25,
            max_retries: None,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait before reconnect attempt `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let jitter = self.jitter.clamp(0.0, 1.0) * (f64::from(attempt) * 7.3).sin();
        let max = self.max_delay.as_secs_f64();
        let delay = (base * (1.0 + jitter)).clamp(0.0, max);
        if delay.is_finite() {
            Duration::from_secs_f64(delay)
        } else {
            self.max_delay
        }
    }

    /// Whether `attempt` failed attempts exhaust the retry limit.
    #[must_use]
    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_retries.is_some_and(|max| attempt >= max)
    }
}
