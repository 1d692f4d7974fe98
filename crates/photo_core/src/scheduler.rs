//! Recurring-callback schedulers.
//!
//! The list state never talks to a clock directly. It asks a [`Scheduler`] for
//! a repeating callback and holds the returned [`ScheduleHandle`]; dropping the
//! handle cancels the callback. Production code uses [`TokioScheduler`], tests
//! drive time by hand with [`ManualScheduler`].

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    runtime::{Handle, TryCurrentError},
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Shortest interval either scheduler will honor.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> ScheduleHandle;
}

/// Cancels its recurring callback when cancelled explicitly or dropped.
#[must_use = "dropping the handle cancels the scheduled callback"]
pub struct ScheduleHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl ScheduleHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Runs each callback on its own task of a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    pub fn from_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, mut callback: TickCallback) -> ScheduleHandle {
        let interval = interval.max(MIN_INTERVAL);
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        debug!(?interval, "scheduled repeating task");
        ScheduleHandle::new(move || task.abort())
    }
}

/// Deterministic scheduler whose clock only moves through [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    entries: Vec<ManualEntry>,
}

struct ManualEntry {
    id: u64,
    interval: Duration,
    next_due: Duration,
    // Taken out while the callback runs so the clock lock is not held.
    callback: Option<TickCallback>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of callbacks that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.lock().entries.len()
    }

    /// Moves the clock forward, firing every due callback once per elapsed
    /// interval in due-time order. Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            let (id, mut callback) = {
                let mut clock = self.lock();
                let due = clock
                    .entries
                    .iter_mut()
                    .filter(|entry| entry.next_due <= target && entry.callback.is_some())
                    .min_by_key(|entry| (entry.next_due, entry.id));
                let Some(entry) = due else {
                    clock.now = target;
                    break;
                };
                let due_at = entry.next_due;
                entry.next_due += entry.interval;
                let id = entry.id;
                let Some(callback) = entry.callback.take() else {
                    continue;
                };
                clock.now = due_at;
                (id, callback)
            };

            callback();
            fired += 1;

            let mut clock = self.lock();
            if let Some(entry) = clock.entries.iter_mut().find(|entry| entry.id == id) {
                entry.callback = Some(callback);
            }
        }

        fired
    }

    fn lock(&self) -> MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> ScheduleHandle {
        let interval = interval.max(MIN_INTERVAL);
        let id = {
            let mut clock = self.lock();
            let id = clock.next_id;
            clock.next_id += 1;
            let next_due = clock.now + interval;
            clock.entries.push(ManualEntry {
                id,
                interval,
                next_due,
                callback: Some(callback),
            });
            id
        };

        let clock = Arc::downgrade(&self.clock);
        ScheduleHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                let mut clock = clock.lock().unwrap_or_else(PoisonError::into_inner);
                clock.entries.retain(|entry| entry.id != id);
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
