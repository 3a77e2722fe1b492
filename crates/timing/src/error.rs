//! Error types for timing primitives

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TimingError>;

/// Errors raised when constructing timing primitives
///
/// Calling a constructed primitive never fails; all validation happens up front.
#[derive(Debug, Error, PartialEq)]
pub enum TimingError {
    /// Delay given in signed milliseconds was below zero
    #[error("invalid delay: {delay_ms}ms (must be >= 0)")]
    NegativeDelay { delay_ms: i64 },

    /// No tokio runtime was available to schedule deferred work on
    #[error("no tokio runtime available (construct inside a runtime or pass a handle)")]
    NoRuntime,

    /// Refill rate was zero, negative, or not finite
    #[error("invalid rate: {per_second} tokens/s (must be finite and > 0)")]
    InvalidRate { per_second: f64 },

    /// Bucket capacity was zero
    #[error("invalid burst: must allow at least one request")]
    InvalidBurst,
}
