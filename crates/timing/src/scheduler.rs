//! Deferred execution facility
//!
//! A scheduler runs a task once after a delay and can cancel it before it
//! runs. Debouncing is written against the [`Scheduler`] trait so the timer
//! mechanism can be swapped (tokio in production, a recording stub in tests).

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::error::{Result, TimingError};

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedule-after-delay / cancel-scheduled capability
pub trait Scheduler: Send + Sync + 'static {
    /// Opaque cancellation handle for one scheduled task
    type Handle: Send + 'static;

    /// Run `task` once after `delay` elapses
    ///
    /// Implementations may run the task before returning (for example on a
    /// zero delay). Callers must not hold locks the task needs.
    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle;

    /// Cancel a scheduled task
    ///
    /// Cancelling a task that already ran is a no-op.
    fn cancel(&self, handle: Self::Handle);
}

/// Cap for deadlines that would overflow `Instant` (about 30 years, as tokio's `sleep`)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Scheduler backed by tokio timers
///
/// Each scheduled task is a spawned tokio task sleeping until its deadline.
/// Cancellation aborts the spawned task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Bind to an explicit runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running in
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| TimingError::NoRuntime)?;
        Ok(Self::new(handle))
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle {
        // Deadline is fixed now, not when the spawned task is first polled
        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or_else(|| {
            warn!("delay {:?} overflows the clock, clamping to {:?}", delay, FAR_FUTURE);
            now + FAR_FUTURE
        });
        trace!("scheduling task in {:?}", delay);

        self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}
