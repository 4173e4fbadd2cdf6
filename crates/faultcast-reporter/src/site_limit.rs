//! Client-side site limiting
//!
//! A token bucket sized to the configured reports-per-minute budget. The
//! bucket starts full and refills continuously, so bursts up to the budget go
//! through immediately and the long-run rate never exceeds it.

use std::sync::Mutex;
use std::time::Instant;

use faultcast_core::SiteLimiting;
use tracing::debug;

#[derive(Debug)]
struct BucketState {
    /// Fractional so refill stays smooth between whole tokens.
    tokens: f64,
    last_refill: Instant,
}

/// Reports-per-minute limiter owned by one reporter's sender.
#[derive(Debug)]
pub struct SiteLimiter {
    capacity: u32,
    /// Tokens per second.
    refill_rate: f64,
    state: Mutex<BucketState>,
}

impl SiteLimiter {
    /// Build a limiter for `limiting`, or `None` when limiting is disabled.
    pub fn new(limiting: SiteLimiting) -> Option<Self> {
        if limiting.is_unlimited() {
            return None;
        }
        let capacity = limiting.reports_per_minute;
        Some(Self {
            capacity,
            refill_rate: f64::from(capacity) / 60.0,
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        })
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            state.tokens = (state.tokens + elapsed * self.refill_rate).min(f64::from(self.capacity));
            state.last_refill = now;
        }
    }

    /// Take one report's worth of budget. Returns `false` when over the limit.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            debug!(
                reports_per_minute = self.capacity,
                "Site limit reached"
            );
            false
        }
    }

    pub fn available_tokens(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);
        state.tokens
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
