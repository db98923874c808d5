/// Market data API rate limiter - 30 requests per minute globally (public tier)
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

lazy_static! {
    static ref CG_RATE_LIMITER: Mutex<CgRateLimiter> =
        Mutex::new(CgRateLimiter::with_limit(30, Duration::from_secs(60)));
}

pub struct CgRateLimiter {
    /// Queue of request timestamps inside the current window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl CgRateLimiter {
    pub fn with_limit(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests,
            window,
        }
    }

    /// Record a request if there is room, otherwise return how long to wait
    fn check_and_record(&mut self, now: Instant) -> Duration {
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) > self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                let elapsed = now.duration_since(oldest);
                if elapsed < self.window {
                    return self.window - elapsed;
                }
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

/// Wait until the shared market data limiter admits one more request
pub async fn rate_limit_cg_api() {
    loop {
        let wait_duration = {
            let mut limiter = match CG_RATE_LIMITER.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            limiter.check_and_record(Instant::now())
        };

        if wait_duration.is_zero() {
            return;
        }

        tracing::debug!("Market API rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let mut limiter = CgRateLimiter::with_limit(30, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..30 {
            assert!(limiter.check_and_record(now).is_zero());
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = CgRateLimiter::with_limit(3, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_and_record(now);
        }

        let wait = limiter.check_and_record(now);
        assert_eq!(wait, Duration::from_secs(60));
    }

    #[test]
    fn test_rate_limiter_frees_slots_after_window() {
        let mut limiter = CgRateLimiter::with_limit(1, Duration::from_secs(1));
        let start = Instant::now();

        assert!(limiter.check_and_record(start).is_zero());
        assert!(!limiter.check_and_record(start).is_zero());
        assert!(limiter.check_and_record(start + Duration::from_secs(2)).is_zero());
    }
}
