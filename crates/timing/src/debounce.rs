//! Debouncing
//!
//! Wraps an action so that a burst of calls collapses into a single
//! execution, run once no new call has arrived for the configured delay.
//! The surviving execution receives the arguments of the last call.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{Result, TimingError};
use crate::scheduler::{Scheduler, TokioScheduler};

/// Convert a signed millisecond delay
///
/// Zero is accepted and means "run on the next scheduling tick".
pub fn delay_from_millis(delay_ms: i64) -> Result<Duration> {
    u64::try_from(delay_ms)
        .map(Duration::from_millis)
        .map_err(|_| TimingError::NegativeDelay { delay_ms })
}

/// Debounce `action` on the current tokio runtime
///
/// Fails with [`TimingError::NoRuntime`] when called outside of a runtime.
pub fn debounce<A, R, F>(action: F, delay: Duration) -> Result<Debounced<A>>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
{
    let scheduler = TokioScheduler::current()?;
    Ok(debounce_on(scheduler, action, delay))
}

/// Debounce `action` with a delay given in signed milliseconds
pub fn debounce_millis<A, R, F>(action: F, delay_ms: i64) -> Result<Debounced<A>>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
{
    let delay = delay_from_millis(delay_ms)?;
    debounce(action, delay)
}

/// Debounce `action` on an explicit scheduler
pub fn debounce_on<A, R, F, S>(scheduler: S, action: F, delay: Duration) -> Debounced<A, S>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    S: Scheduler,
{
    let action: Action<A> = Box::new(move |args| {
        // Return value is discarded
        let _ = action(args);
    });

    Debounced {
        inner: Arc::new(Inner {
            action,
            delay,
            scheduler,
            slot: Mutex::new(Slot {
                pending: None,
                generation: 0,
                fired: 0,
            }),
        }),
    }
}

type Action<A> = Box<dyn Fn(A) + Send + Sync>;

/// A debounced action
///
/// Clones share the same pending execution: calling any clone restarts the
/// quiet period for all of them.
pub struct Debounced<A, S: Scheduler = TokioScheduler> {
    inner: Arc<Inner<A, S>>,
}

struct Inner<A, S: Scheduler> {
    action: Action<A>,
    delay: Duration,
    scheduler: S,
    slot: Mutex<Slot<S::Handle>>,
}

/// Pending execution state
///
/// `generation` increases on every call. A scheduled execution only runs if
/// its generation is still current when it fires, which drops executions
/// whose timer fired concurrently with a newer call. `fired` records the last
/// generation that ran, so a handle returned after its task already ran
/// inline is not kept as pending.
struct Slot<H> {
    pending: Option<H>,
    generation: u64,
    fired: u64,
}

impl<A, S> Debounced<A, S>
where
    A: Send + 'static,
    S: Scheduler,
{
    /// Restart the quiet period with `args` as the arguments to run with
    ///
    /// The slot lock is never held while the scheduler runs.
    pub fn call(&self, args: A) {
        let (previous, generation) = {
            let mut slot = self.inner.slot.lock();
            slot.generation = slot.generation.wrapping_add(1);
            (slot.pending.take(), slot.generation)
        };

        if let Some(handle) = previous {
            trace!("cancelling pending execution");
            self.inner.scheduler.cancel(handle);
        }

        let inner = Arc::clone(&self.inner);
        let handle = self
            .inner
            .scheduler
            .schedule(self.inner.delay, Box::new(move || inner.fire(generation, args)));

        let mut slot = self.inner.slot.lock();
        if slot.generation == generation && slot.fired != generation {
            slot.pending = Some(handle);
        } else {
            // Superseded by a newer call, or already ran inline
            drop(slot);
            self.inner.scheduler.cancel(handle);
        }
    }

    /// Closure form of [`Debounced::call`]
    pub fn as_fn(&self) -> impl Fn(A) + Clone + Send + Sync + 'static {
        let this = self.clone();
        move |args| this.call(args)
    }

    /// Whether an execution is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<A, S: Scheduler> Inner<A, S> {
    fn fire(&self, generation: u64, args: A) {
        {
            let mut slot = self.slot.lock();
            if slot.generation != generation {
                debug!("dropping stale execution (generation {})", generation);
                return;
            }
            slot.pending = None;
            slot.fired = generation;
        }

        // Lock is released so the action may call back into the same wrapper
        debug!("quiet period of {:?} elapsed, running action", self.delay);
        (self.action)(args);
    }
}

impl<A, S: Scheduler> Clone for Debounced<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S: Scheduler> std::fmt::Debug for Debounced<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("delay", &self.inner.delay)
            .field("pending", &self.inner.slot.lock().pending.is_some())
            .finish()
    }
}
