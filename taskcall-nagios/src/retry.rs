//! Bounded sequential retry around a single fallible operation
//!
//! The policy owns the attempt ceiling, the per-attempt timeout, the pause
//! between attempts and the predicate deciding which HTTP status is a success.

use reqwest::StatusCode;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// One initial attempt plus three retries
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Per-attempt deadline was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {}s", .0.as_secs_f32())]
pub struct TimedOut(pub Duration);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub delay: Duration,
    pub accept: fn(StatusCode) -> bool,
}

/// Value produced by the first successful attempt
#[derive(Debug)]
pub struct Succeeded<T> {
    pub value: T,
    pub attempts: u32,
}

/// Every attempt failed; carries the error of the last one
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// TaskCall acknowledges a notification with a plain 200
pub fn accept_ok(status: StatusCode) -> bool {
    status == StatusCode::OK
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(60),
            delay: Duration::ZERO,
            accept: accept_ok,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            attempt_timeout,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn accepts(&self, status: StatusCode) -> bool {
        (self.accept)(status)
    }

    /// Run `op` until it succeeds or the attempt ceiling is reached.
    ///
    /// `op` receives the 1-based attempt number. A ceiling of zero still
    /// performs one attempt.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<Succeeded<T>, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<TimedOut> + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!("Attempt {}", attempt);

            let outcome = match tokio::time::timeout(self.attempt_timeout, op(attempt)).await {
                Ok(result) => result,
                Err(_) => Err(E::from(TimedOut(self.attempt_timeout))),
            };

            match outcome {
                Ok(value) => return Ok(Succeeded { value, attempts: attempt }),
                Err(e) => {
                    error!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                    if attempt >= max_attempts {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }
}
