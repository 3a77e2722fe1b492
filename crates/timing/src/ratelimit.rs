//! Per-key token bucket rate limiting
//!
//! Every key (typically a client address) owns a bucket that starts full,
//! refills continuously at a fixed rate and holds at most `burst` tokens.
//! Each allowed request spends one token.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::error::{Result, TimingError};

/// Default refill rate (tokens per second)
pub const DEFAULT_PER_SECOND: f64 = 5.0;

/// Default bucket capacity
pub const DEFAULT_BURST: u32 = 10;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(burst: u32, now: Instant) -> Self {
        Self {
            tokens: f64::from(burst),
            last_refill: now,
        }
    }

    fn try_take(&mut self, per_second: f64, burst: u32, now: Instant) -> bool {
        // Instants earlier than the last refill add nothing
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * per_second).min(f64::from(burst));
        if now > self.last_refill {
            self.last_refill = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiter keyed by `K`
pub struct RateLimiter<K> {
    buckets: DashMap<K, TokenBucket>,
    per_second: f64,
    burst: u32,
}

impl<K> RateLimiter<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a limiter refilling `per_second` tokens per second with room for `burst`
    pub fn new(per_second: f64, burst: u32) -> Result<Self> {
        if !per_second.is_finite() || per_second <= 0.0 {
            return Err(TimingError::InvalidRate { per_second });
        }
        if burst == 0 {
            return Err(TimingError::InvalidBurst);
        }

        Ok(Self {
            buckets: DashMap::new(),
            per_second,
            burst,
        })
    }

    /// Spend one token for `key` if available
    pub fn allow(&self, key: &K) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// Same as [`RateLimiter::allow`] with an explicit clock reading
    pub fn allow_at(&self, key: &K, now: Instant) -> bool {
        let mut bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| TokenBucket::full(self.burst, now));

        let allowed = bucket.try_take(self.per_second, self.burst, now);
        if !allowed {
            trace!("rate limit exceeded ({} tokens left)", bucket.tokens);
        }
        allowed
    }

    /// Drop buckets not touched for at least `idle`
    ///
    /// Returns how many buckets were removed.
    pub fn evict_idle(&self, idle: Duration, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < idle);
        before.saturating_sub(self.buckets.len())
    }

    /// Time for an empty bucket to refill completely
    ///
    /// A bucket idle for this long is full again, so evicting it loses nothing.
    pub fn refill_window(&self) -> Duration {
        Duration::try_from_secs_f64(f64::from(self.burst) / self.per_second).unwrap_or(Duration::MAX)
    }

    /// Number of keys with a live bucket
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }

    pub fn per_second(&self) -> f64 {
        self.per_second
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }
}

impl<K> Default for RateLimiter<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self {
            buckets: DashMap::new(),
            per_second: DEFAULT_PER_SECOND,
            burst: DEFAULT_BURST,
        }
    }
}
