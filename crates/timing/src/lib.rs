//! Timing primitives for Lull
//!
//! This crate provides:
//! - Debouncing (collapse bursts of calls into one delayed execution)
//! - A deferred-execution seam with a tokio implementation
//! - Per-key token bucket rate limiting

pub mod debounce;
pub mod error;
pub mod ratelimit;
pub mod scheduler;

pub use debounce::{debounce, debounce_millis, debounce_on, delay_from_millis, Debounced};
pub use error::{Result, TimingError};
pub use ratelimit::RateLimiter;
pub use scheduler::{Scheduler, Task, TokioScheduler};
