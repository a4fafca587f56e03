//! Bounded retry with a fixed backoff
//!
//! Every operation the crawler retries goes through [`RetryPolicy::run`]: the
//! first attempt plus at most `max_retries` more, with a fixed sleep between
//! attempts.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use std::time::Duration;

/// An async operation that can be attempted repeatedly
#[async_trait]
pub trait Operation: Send {
    type Output: Send;
    type Error: Send;

    async fn attempt(&mut self) -> Result<Self::Output, Self::Error>;
}

/// Returned when every attempt failed
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Number of attempts made (`max_retries + 1`)
    pub attempts: u32,

    /// Error of the final attempt
    pub error: E,
}

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Runs `operation` until it succeeds or the retry budget is spent
    ///
    /// `on_retry` is called with the retry number (1-based) and the error that
    /// caused it, before the backoff sleep. It is not called for the final
    /// failure; that one is returned in [`Exhausted`].
    pub async fn run<Op, F>(
        &self,
        operation: &mut Op,
        mut on_retry: F,
    ) -> Result<Op::Output, Exhausted<Op::Error>>
    where
        Op: Operation,
        F: FnMut(u32, &Op::Error),
    {
        let mut failures = 0u32;

        loop {
            match operation.attempt().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    failures += 1;
                    if failures > self.max_retries {
                        return Err(Exhausted {
                            attempts: failures,
                            error,
                        });
                    }

                    on_retry(failures, &error);

                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
    }
}
