use crate::llm::client::LLMError;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// 10 requests per minute
const RATE_LIMIT_REQUESTS: usize = 10;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Client-side sliding-window limiter shared by the HTTP backends
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    request_times: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limit(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW)
    }

    pub fn with_limit(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_times: Mutex::new(Vec::new()),
        }
    }

    /// Record a request, or fail with the number of seconds to wait
    pub fn check(&self) -> Result<(), LLMError> {
        let now = Instant::now();
        // A poisoned lock only means another request panicked mid-check
        let mut times = self
            .request_times
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        times.retain(|&time| now.duration_since(time) < self.window);

        if times.len() >= self.max_requests {
            let oldest = times[0];
            let wait_time = self.window.saturating_sub(now.duration_since(oldest));
            return Err(LLMError::RateLimitExceeded(wait_time.as_secs()));
        }

        times.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiting_allows_initial_requests() {
        let limiter = RateLimiter::new();
        for _ in 0..10 {
            assert!(limiter.check().is_ok());
        }
    }

    #[test]
    fn test_rate_limiting_blocks_excess_requests() {
        let limiter = RateLimiter::new();
        for _ in 0..10 {
            limiter.check().unwrap();
        }

        let result = limiter.check();
        assert!(matches!(result.unwrap_err(), LLMError::RateLimitExceeded(_)));
    }

    #[test]
    fn test_rate_limiting_window_expiry() {
        let limiter = RateLimiter::with_limit(2, Duration::from_millis(50));
        limiter.check().unwrap();
        limiter.check().unwrap();
        assert!(limiter.check().is_err());

        std::thread::sleep(Duration::from_millis(80));
        assert!(limiter.check().is_ok());
    }
}
