//! Retry and deadline helpers for backend calls.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::RetryConfig;

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// Only `BackendUnavailable` is retried; every other error is contractual
/// and returned immediately. The attempt count is bounded by
/// `config.max_retries` on top of the backoff schedule.
pub async fn with_backoff<T, F, Fut>(config: &RetryConfig, mut operation: F) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut schedule = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(config.initial_backoff_ms))
        .with_max_interval(Duration::from_millis(config.max_backoff_ms))
        .with_max_elapsed_time(None)
        .build();

    let mut attempts = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempts < config.max_retries => {
                attempts += 1;
                let delay = schedule
                    .next_backoff()
                    .unwrap_or(Duration::from_millis(config.max_backoff_ms));
                tracing::warn!(attempt = attempts, error = %err, delay_ms = delay.as_millis() as u64, "transient backend error, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Bound `future` by a deadline; an elapsed deadline is reported as
/// `BackendUnavailable` so callers can treat it like any other transient
/// backend fault.
pub async fn with_deadline<T, Fut>(timeout: Duration, future: Fut) -> StorageResult<T>
where
    Fut: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::BackendUnavailable(format!(
            "operation exceeded {}ms deadline",
            timeout.as_millis()
        ))),
    }
}
