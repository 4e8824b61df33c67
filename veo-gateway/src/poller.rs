//! Bounded fixed-cadence polling.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Attempt budget used when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
/// Wait before each attempt when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Poll cadence and attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Worst-case time spent waiting between attempts.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Source of delays between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Terminal state of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The completion predicate matched on attempt `attempts`.
    Done { value: T, attempts: u32 },
    /// The budget ran out without a match.
    TimedOut { attempts: u32 },
}

/// Poll `query` until `is_done` matches or the attempt budget is spent.
///
/// Every attempt first waits `policy.interval` and then runs one query; only one query is in
/// flight at a time. Query errors end the poll immediately.
pub async fn poll_until<T, F, Fut, P>(
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
    mut query: F,
    is_done: P,
) -> Result<PollOutcome<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        sleeper.sleep(policy.interval).await;
        let value = query(attempt).await?;
        if is_done(&value) {
            return Ok(PollOutcome::Done {
                value,
                attempts: attempt,
            });
        }
    }
    Ok(PollOutcome::TimedOut {
        attempts: policy.max_attempts,
    })
}
