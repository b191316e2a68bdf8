use std::time::Duration;
use tokio::time::Instant;

/// Cooperative throttle: successive calls are spaced at least `min_interval`
/// apart. No bursting, no queueing; callers are sequential.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// No pacing at all, for offline tests
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleep until the next call is allowed, then claim the slot
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_call {
            tokio::time::sleep_until(last + self.min_interval).await;
        }
        self.last_call = Some(Instant::now());
    }
}
