//! Conflict retry for optimistic transactions.
//!
//! An attempt that fails with [`OrderError::Conflict`] is re-run against fresh
//! reads after an exponential backoff with jitter. Any other outcome is final.
//! When attempts or the overall deadline run out the caller gets
//! [`OrderError::Busy`].

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub deadline_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 10,
            max_backoff_ms: 200,
            deadline_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Retry immediately, without sleeping. Useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff_ms: 0,
            max_backoff_ms: 0,
            deadline_ms: 60_000,
        }
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff_ms = base.as_millis() as u64;
        self.max_backoff_ms = max.as_millis() as u64;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = deadline.as_millis() as u64;
        self
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let millis = self
            .base_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Run `attempt` until it stops reporting conflicts.
    pub(crate) fn run<T, F>(&self, operation: &str, mut attempt: F) -> Result<T, OrderError>
    where
        F: FnMut(u32) -> Result<T, OrderError>,
    {
        let started = Instant::now();
        let max_attempts = self.max_attempts.max(1);
        let mut tries = 0;

        loop {
            tries += 1;
            let reason = match attempt(tries) {
                Err(OrderError::Conflict(reason)) => reason,
                outcome => return outcome,
            };

            if tries >= max_attempts {
                warn!(operation, attempts = tries, %reason, "conflict retries exhausted");
                return Err(OrderError::Busy { attempts: tries });
            }

            let backoff = jittered(self.backoff_for(tries));
            if started.elapsed() + backoff > self.deadline() {
                warn!(operation, attempts = tries, %reason, "retry deadline exceeded");
                return Err(OrderError::Busy { attempts: tries });
            }

            debug!(operation, attempt = tries, backoff_ms = backoff.as_millis() as u64, %reason, "retrying after conflict");
            if !backoff.is_zero() {
                thread::sleep(backoff);
            }
        }
    }
}

/// Add up to 50% random jitter so racing writers spread out.
fn jittered(backoff: Duration) -> Duration {
    let millis = backoff.as_millis() as u64;
    if millis == 0 {
        return backoff;
    }
    let extra = rand::thread_rng().gen_range(0..=millis / 2);
    Duration::from_millis(millis + extra)
}
