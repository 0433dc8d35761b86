use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Enforces a minimum gap between the end of one request and the start of the next.
///
/// Imports run as one sequential flow, so the limiter is driven through `&mut self`
/// by its single owner instead of sharing the timestamp behind a lock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_completed: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_completed: None,
        }
    }

    pub fn from_secs_f64(seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(seconds.max(0.0)))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Delay applied before the single retry of a throttled request.
    pub fn backoff_delay(&self) -> Duration {
        self.min_interval * 2
    }

    pub fn remaining(&self) -> Duration {
        match self.last_completed {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    pub async fn wait_turn(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tracing::debug!("Rate limiter waiting {:?} before next request", remaining);
            tokio::time::sleep(remaining).await;
        }
    }

    pub fn record_completion(&mut self) {
        self.last_completed = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
