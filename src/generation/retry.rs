use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff: wait `initial_backoff` after the first failure and
/// double it after each further one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `op` until it succeeds, fails with an error `is_transient` rejects,
/// or the policy runs out of attempts. The last error is returned.
pub async fn retry<T, E, F, Fut, P>(policy: RetryPolicy, is_transient: P, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 >= attempts || !is_transient(&e) => return Err(e),
            Err(e) => {
                let delay = policy.backoff(attempt);
                warn!(attempt = attempt + 1, ?delay, "request failed, retrying: {}", e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tokio::time::Instant;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..4).map(|a| policy.backoff(a).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000]);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_gives_up_after_five_attempts() {
        let calls = RefCell::new(Vec::new());
        let start = Instant::now();

        let result: Result<(), String> = retry(RetryPolicy::default(), |_: &String| true, || {
            calls.borrow_mut().push(start.elapsed().as_millis());
            async { Err("unavailable".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "unavailable");
        assert_eq!(*calls.borrow(), vec![0, 1000, 3000, 7000, 15000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_success() {
        let mut remaining_failures = 2;
        let start = Instant::now();

        let result = retry(RetryPolicy::default(), |_: &&str| true, || {
            let outcome = if remaining_failures > 0 {
                remaining_failures -= 1;
                Err("flaky")
            } else {
                Ok(42)
            };
            async move { outcome }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(start.elapsed().as_millis(), 3000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let mut calls = 0;
        let start = Instant::now();

        let result: Result<(), &str> = retry(RetryPolicy::default(), |e: &&str| *e != "forbidden", || {
            calls += 1;
            async { Err("forbidden") }
        })
        .await;

        assert_eq!(result, Err("forbidden"));
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed().as_millis(), 0);
    }
}
