//! Authoritative photo ordering plus the randomized relocate driver.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{
    domain::{first_duplicate_id, PhotoId, PhotoRecord},
    revision::ListRevision,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

use crate::scheduler::{ScheduleHandle, Scheduler, TickCallback};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(300);
const REVISION_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListStateError {
    #[error("photo list contains duplicate id {0}")]
    DuplicatePhotoId(PhotoId),
}

/// Supplies the indices drawn on each tick. Implementations must return a
/// value in `0..len`; `len` is always at least 2.
pub trait IndexSource: Send {
    fn draw(&mut self, len: usize) -> usize;
}

pub struct RandomIndices {
    rng: StdRng,
}

impl RandomIndices {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSource for RandomIndices {
    fn draw(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Removes the element at `from` and reinserts it at `to`, where `to` indexes
/// the sequence after removal. Returns false and leaves `items` untouched when
/// either index is out of range.
pub fn relocate<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

pub struct PhotoListState {
    shared: Arc<Mutex<ListInner>>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
}

struct ListInner {
    photos: Vec<PhotoRecord>,
    latest: ListRevision,
    next_sequence: u64,
    // Bumped by every load/stop; callbacks from an older driver are ignored.
    generation: u64,
    running: bool,
    driver: Option<ScheduleHandle>,
    indices: Box<dyn IndexSource>,
    revisions: broadcast::Sender<ListRevision>,
}

impl ListInner {
    fn publish(&mut self) -> ListRevision {
        self.next_sequence += 1;
        let revision = ListRevision::new(self.next_sequence, self.photos.clone());
        self.latest = revision.clone();
        // Err only means nobody is subscribed right now.
        let _ = self.revisions.send(revision.clone());
        revision
    }

    fn can_tick(&self) -> bool {
        self.running && self.photos.len() > 1
    }

    fn tick(&mut self) -> Option<ListRevision> {
        if !self.can_tick() {
            return None;
        }
        let len = self.photos.len();
        let from = self.indices.draw(len);
        let to = self.indices.draw(len);
        self.relocate_and_publish(from, to)
    }

    fn relocate_and_publish(&mut self, from: usize, to: usize) -> Option<ListRevision> {
        if !self.can_tick() || !relocate(&mut self.photos, from, to) {
            return None;
        }
        let revision = self.publish();
        debug!(from, to, sequence = revision.sequence(), "relocated photo");
        Some(revision)
    }

    fn halt(&mut self) -> Option<ScheduleHandle> {
        self.generation += 1;
        self.running = false;
        self.driver.take()
    }
}

impl PhotoListState {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_options(
            scheduler,
            DEFAULT_TICK_INTERVAL,
            Box::new(RandomIndices::from_entropy()),
        )
    }

    pub fn with_options(
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
        indices: Box<dyn IndexSource>,
    ) -> Self {
        let (revisions, _) = broadcast::channel(REVISION_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Mutex::new(ListInner {
                photos: Vec::new(),
                latest: ListRevision::empty(),
                next_sequence: 0,
                generation: 0,
                running: false,
                driver: None,
                indices,
                revisions,
            })),
            scheduler,
            interval,
        }
    }

    /// Replaces the current ordering with `initial`, publishes it, and restarts
    /// the reorder driver when there is more than one photo to move.
    pub fn load(&self, initial: Vec<PhotoRecord>) -> Result<ListRevision, ListStateError> {
        if let Some(duplicate) = first_duplicate_id(&initial) {
            return Err(ListStateError::DuplicatePhotoId(duplicate));
        }

        let mut guard = self.lock();
        let previous_driver = guard.halt();
        drop(previous_driver);

        guard.photos = initial;
        guard.running = true;
        let revision = guard.publish();

        if guard.photos.len() > 1 {
            let callback = driver_callback(Arc::downgrade(&self.shared), guard.generation);
            guard.driver = Some(self.scheduler.schedule_repeating(self.interval, callback));
        }

        info!(
            count = revision.len(),
            driver = guard.driver.is_some(),
            interval = ?self.interval,
            "loaded photo list"
        );
        Ok(revision)
    }

    /// Relocates one randomly drawn photo to a randomly drawn position.
    /// Does nothing while fewer than two photos are loaded or after `stop`.
    pub fn tick(&self) -> Option<ListRevision> {
        self.lock().tick()
    }

    /// Same as [`tick`](Self::tick) with the indices supplied by the caller.
    pub fn tick_with(&self, from: usize, to: usize) -> Option<ListRevision> {
        self.lock().relocate_and_publish(from, to)
    }

    /// Cancels the driver and ends every open revision stream. Nothing is
    /// published after this returns; a later `load` publishes to new
    /// subscribers only.
    pub fn stop(&self) {
        let driver = {
            let mut guard = self.lock();
            let was_running = guard.running;
            let driver = guard.halt();
            // Dropping the old sender closes the receivers handed out so far.
            guard.revisions = broadcast::channel(REVISION_CHANNEL_CAPACITY).0;
            if was_running {
                info!(sequence = guard.latest.sequence(), "stopped photo list driver");
            }
            driver
        };
        drop(driver);
    }

    pub fn is_running(&self) -> bool {
        self.lock().driver.is_some()
    }

    pub fn snapshot(&self) -> ListRevision {
        self.lock().latest.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListRevision> {
        self.lock().revisions.subscribe()
    }

    pub fn revisions(&self) -> BroadcastStream<ListRevision> {
        BroadcastStream::new(self.subscribe())
    }

    fn lock(&self) -> MutexGuard<'_, ListInner> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PhotoListState {
    fn drop(&mut self) {
        self.stop();
    }
}

fn driver_callback(
    shared: Weak<Mutex<ListInner>>,
    generation: u64,
) -> TickCallback {
    Box::new(move || {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.generation != generation {
            return;
        }
        guard.tick();
    })
}

#[cfg(test)]
#[path = "tests/list_state_tests.rs"]
mod tests;
