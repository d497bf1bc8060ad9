//! Retry policy for requests to the search service.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::config::RetrySettings;
use crate::error::ClientResult;

/// Exponential backoff applied to transient failures only.
///
/// Status errors other than gateway failures and decode errors are
/// returned immediately: the service answered, and asking again will not
/// change its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    min_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, min_delay: Duration) -> Self {
        Self {
            max_retries,
            min_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Run `operation`, retrying transient failures.
    pub async fn run<T, F, Fut>(&self, what: &str, operation: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if self.max_retries == 0 {
            let mut operation = operation;
            return operation().await;
        }

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries);

        operation
            .retry(backoff)
            .when(|e| e.is_transient())
            .notify(|e, delay| {
                log::warn!("{} failed ({}), retrying in {:?}", what, e, delay);
            })
            .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self::new(
            settings.max_retries,
            Duration::from_millis(settings.min_delay_ms),
        )
    }
}
