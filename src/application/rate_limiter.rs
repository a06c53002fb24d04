//! Minimum-interval rate limiter
//!
//! Guarantees at least `min_interval` between consecutive permits. The
//! clock is injected so tests can run without real sleeps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ports::Clock;

/// Default spacing between outbound messages
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

pub struct MinIntervalLimiter {
    clock: Arc<dyn Clock>,
    min_interval: Duration,
    last_permit: Option<Instant>,
}

impl MinIntervalLimiter {
    pub fn new(clock: Arc<dyn Clock>, min_interval: Duration) -> Self {
        Self {
            clock,
            min_interval,
            last_permit: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before the next permit, zero if one is available now
    pub fn remaining(&self) -> Duration {
        match self.last_permit {
            Some(last) => {
                let elapsed = self.clock.instant().saturating_duration_since(last);
                self.min_interval.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        }
    }

    /// Wait until a permit is available, then take it
    pub async fn acquire(&mut self) {
        let wait = self.remaining();
        if !wait.is_zero() {
            tracing::debug!("Rate limiter waiting {:?}", wait);
            self.clock.sleep(wait).await;
        }
        self.last_permit = Some(self.clock.instant());
    }
}

impl std::fmt::Debug for MinIntervalLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinIntervalLimiter")
            .field("min_interval", &self.min_interval)
            .field("last_permit", &self.last_permit)
            .finish()
    }
}
