// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Back-off retries for working copies held by another process.

use backon::{BackoffBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use svw_adapters::ExecutionError;
use svw_core::ErrorKind;

/// Quadratic back-off: retry `n` waits `n² × base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for LockRetryPolicy {
    fn default() -> Self {
        Self { max_retries: 10, base_delay: Duration::from_millis(50) }
    }
}

impl LockRetryPolicy {
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay.checked_mul(retry.saturating_mul(retry)).unwrap_or(Duration::MAX)
    }
}

/// Delays for one retry run; ends after `max_retries` items.
#[derive(Debug)]
pub struct QuadraticBackoff {
    policy: LockRetryPolicy,
    retry: u32,
}

impl Iterator for QuadraticBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.retry >= self.policy.max_retries {
            return None;
        }
        self.retry += 1;
        Some(self.policy.delay(self.retry))
    }
}

impl BackoffBuilder for LockRetryPolicy {
    type Backoff = QuadraticBackoff;

    fn build(self) -> Self::Backoff {
        QuadraticBackoff { policy: self, retry: 0 }
    }
}

/// Re-run `op` while it fails with a repository lock, up to
/// `policy.max_retries` extra attempts. Any other outcome is returned as is.
pub async fn retry_while_locked<T, F, Fut>(policy: LockRetryPolicy, op: F) -> Result<T, ExecutionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExecutionError>>,
{
    op.retry(policy)
        .when(|e: &ExecutionError| e.kind == ErrorKind::RepositoryLocked)
        .notify(|e: &ExecutionError, delay: Duration| {
            tracing::debug!(command = %e.argument, ?delay, "working copy locked, backing off");
        })
        .await
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
