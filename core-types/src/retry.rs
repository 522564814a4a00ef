// Copyright (c) James Kassemi, SC, US. All rights reserved.
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Bounded retry with jittered linear backoff, gated by a transient-error
/// predicate so permanent failures surface on the first attempt.
///
/// Used for optimistic-concurrency write collisions against the ledger:
/// the operation re-reads current state on every attempt.
#[derive(Debug, Clone)]
pub struct ConflictRetry {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl ConflictRetry {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    fn next_delay(&self, attempt: usize) -> Duration {
        let base = self.base_delay.saturating_mul(attempt as u32 + 1);
        if base.is_zero() {
            return base;
        }
        let jitter_us = rand::thread_rng().gen_range(0..=base.as_micros() as u64 / 2);
        base + Duration::from_micros(jitter_us)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or
    /// `max_attempts` is exhausted; the last error is returned as-is.
    pub async fn run<P, F, Fut, T, E>(&self, mut is_transient: P, mut op: F) -> Result<T, E>
    where
        P: FnMut(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(val) => return Ok(val),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !is_transient(&err) {
                        return Err(err);
                    }
                    sleep(self.next_delay(attempt - 1)).await;
                }
            }
        }
    }
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(25))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn new_clamps_attempts() {
        let retry = ConflictRetry::new(0, Duration::ZERO);
        assert_eq!(retry.max_attempts, 1);
    }

    #[test]
    fn next_delay_grows_linearly_without_jitter() {
        let retry = ConflictRetry::new(3, Duration::ZERO);
        assert_eq!(retry.next_delay(0), Duration::ZERO);
        assert_eq!(retry.next_delay(2), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let retry = ConflictRetry::new(3, Duration::from_millis(5));
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<&str, &str> = retry
            .run(
                |_| true,
                || {
                    let attempts = attempts.clone();
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err("conflict")
                        } else {
                            Ok("ok")
                        }
                    }
                },
            )
            .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn surfaces_permanent_error_immediately() {
        let retry = ConflictRetry::new(5, Duration::from_millis(5));
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), &str> = retry
            .run(
                |err| *err == "conflict",
                || {
                    let attempts = attempts.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err("not found")
                    }
                },
            )
            .await;
        assert_eq!(result, Err("not found"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_attempts() {
        let retry = ConflictRetry::new(2, Duration::from_millis(5));
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), &str> = retry
            .run(
                |_| true,
                || {
                    let attempts = attempts.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err("conflict")
                    }
                },
            )
            .await;
        assert_eq!(result, Err("conflict"));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
