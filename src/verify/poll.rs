// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded fixed-interval polling

use crate::error::{Result, VerifyError};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Retries an attempt a fixed number of times with a fixed delay in between
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    attempts: u32,
    interval: Duration,
}

impl Poller {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `attempt` until it succeeds or the budget is spent.
    ///
    /// Returns the first successful value, or `RetryExhausted` carrying the
    /// last failure reason.
    pub async fn run<F, Fut, T, E>(&self, what: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let mut last_error = String::new();

        for i in 1..=self.attempts {
            match attempt().await {
                Ok(value) => {
                    debug!("{} succeeded on attempt {}/{}", what, i, self.attempts);
                    return Ok(value);
                }
                Err(e) => {
                    last_error = e.to_string();
                    info!(
                        "{}: attempt {}/{} failed: {}",
                        what, i, self.attempts, last_error
                    );
                }
            }

            if i < self.attempts {
                sleep(self.interval).await;
            }
        }

        warn!("{} gave up after {} attempts", what, self.attempts);
        Err(VerifyError::RetryExhausted {
            what: what.to_string(),
            attempts: self.attempts,
            last_error,
        })
    }
}
