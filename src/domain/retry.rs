//! Fixed-delay bounded retry.
//!
//! One policy object drives both the webhook order-lookup retry and the
//! shipment tracking poll, so retry behavior is configured and tested in a
//! single place. Delays are fixed, not exponential: both callers wait on
//! external systems with known, short settle times.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        // A policy that never attempts is a misconfiguration.
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds or `max_attempts` is reached, sleeping
    /// `delay` between attempts. The attempt number (1-based) is passed to
    /// `op`. Returns the last error on exhaustion.
    ///
    /// Nothing is held across the sleep except the operation itself; callers
    /// must not enter this with row locks taken.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(_) => {
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
