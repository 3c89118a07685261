//! Retry Policy - 通用重试与指数退避
//!
//! 包装任意可失败的异步操作：最多 `max_retries` 次额外尝试，
//! 第一次重试前等待 `initial_delay`，之后每次乘以 `multiplier`。

use std::future::Future;
use std::time::Duration;

/// 重试策略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 额外重试次数（总尝试次数 = max_retries + 1）
    pub max_retries: u32,
    /// 第一次重试前的等待时间
    pub initial_delay: Duration,
    /// 退避倍数
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            multiplier: 1.5,
        }
    }
}

/// 重试耗尽（或遇到不可重试的错误）
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// 实际尝试次数
    pub attempts: u32,
    /// 最后一次的错误
    pub last_error: E,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier,
        }
    }

    /// 不重试
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// 第 `retry` 次重试（从 1 开始）之前的等待时间
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// 执行操作，`is_retryable` 为 false 的错误立即返回
    ///
    /// `operation` 收到当前尝试序号（从 1 开始）
    pub async fn run<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        is_retryable: P,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt > self.max_retries || !is_retryable(&err) {
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }

            let delay = self.delay_before_retry(attempt);
            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100), 2.0)
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), 1.5);
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(150));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(225));
    }

    #[test]
    fn test_huge_exponent_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1), 10.0);
        assert_eq!(policy.delay_before_retry(10_000), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let recorded = calls.clone();
        let result: Result<u32, RetryExhausted<String>> = policy(3)
            .run(
                |attempt| {
                    recorded.lock().unwrap().push(start.elapsed());
                    async move {
                        if attempt < 3 {
                            Err("busy".to_string())
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_millis(100));
        assert_eq!(calls[2] - calls[1], Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget() {
        let result: Result<(), _> = policy(2)
            .run(|_| async { Err::<(), _>("down") }, |_| true)
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, "down");
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let result: Result<(), _> = policy(5)
            .run(|_| async { Err::<(), _>("rejected") }, |e| *e != "rejected")
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let result: Result<(), _> = RetryPolicy::no_retry()
            .run(|_| async { Err::<(), _>("busy") }, |_| true)
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
