use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// How long [`Connector`](super::Connector) keeps waiting for the viewer.
///
/// The default waits forever, retrying every [`DEFAULT_RETRY_INTERVAL`].
/// `max_attempts` counts every connect attempt including the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub max_elapsed: Option<Duration>,
}

impl RetryPolicy {
    pub const fn unbounded() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
            max_elapsed: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_elapsed.is_some()
    }

    pub(crate) fn schedule(&self) -> RetrySchedule {
        // Constant interval: no growth, no jitter.
        let mut backoff = ExponentialBackoff {
            current_interval: self.interval,
            initial_interval: self.interval,
            randomization_factor: 0.0,
            multiplier: 1.0,
            max_interval: self.interval,
            max_elapsed_time: self.max_elapsed,
            ..Default::default()
        };
        backoff.reset();

        RetrySchedule {
            backoff,
            max_attempts: self.max_attempts,
            attempts: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Running state of one connect loop.
pub(crate) struct RetrySchedule {
    backoff: ExponentialBackoff,
    max_attempts: Option<u32>,
    attempts: u32,
}

impl RetrySchedule {
    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn can_attempt(&self) -> bool {
        self.max_attempts.is_none_or(|max| self.attempts < max)
    }

    /// Delay before the next attempt, `None` once the elapsed budget is spent.
    pub(crate) fn next_delay(&mut self) -> Option<Duration> {
        self.backoff.next_backoff()
    }
}
