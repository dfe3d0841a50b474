use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Token bucket shared by every analyze request.
///
/// Holds at most `rps` tokens and refills continuously at `rps` tokens per second.
#[derive(Clone)]
pub struct RateLimiter {
    rps: u32,
    bucket: Arc<Mutex<Bucket>>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        let rps = rps.max(1);
        Self {
            rps,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rps as f64,
                refilled_at: Instant::now(),
            })),
        }
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    /// Take one token, or return how long until one is available.
    pub async fn acquire(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at);
        bucket.refilled_at = now;

        let capacity = self.rps as f64;
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * capacity).min(capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        Err(Duration::from_secs_f64((1.0 - bucket.tokens) / capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_up_to_capacity_then_reject() {
        let limiter = RateLimiter::new(3);
        for _ in 0..3 {
            assert!(limiter.acquire().await.is_ok());
        }
        let wait = limiter.acquire().await.unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn refills_over_time() {
        let limiter = RateLimiter::new(20);
        for _ in 0..20 {
            limiter.acquire().await.unwrap();
        }
        assert!(limiter.acquire().await.is_err());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(limiter.acquire().await.is_ok());
    }

    #[test]
    fn zero_rate_is_clamped() {
        assert_eq!(RateLimiter::new(0).rps(), 1);
    }
}
