//! Token-bucket spacing of outbound LLM calls.
//!
//! The bucket holds up to `burst` tokens and regains one every `interval`. With the default
//! `burst = 1` consecutive calls are spaced by at least `interval`.

use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};
use tracing::debug;

use crate::config::RateLimitConfig;

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

pub struct RateLimiter {
    burst: f64,
    interval: Duration,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(burst: u32, interval: Duration) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            burst,
            interval,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                refilled_at: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.burst, config.interval())
    }

    /// Never waits.
    pub fn unlimited() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let regained = now.duration_since(bucket.refilled_at).as_secs_f64()
                    / self.interval.as_secs_f64();
                bucket.tokens = (bucket.tokens + regained).min(self.burst);
                bucket.refilled_at = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                self.interval.mul_f64(1.0 - bucket.tokens)
            };
            debug!(wait_ms = wait.as_millis() as u64, "rate limited");
            sleep(wait).await;
        }
    }
}
