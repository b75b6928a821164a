//! Event pool
//!
//! Bounded free-list of recycled events plus the scratch buffers that
//! batch, split and clamp reuse between calls. Each is behind its own
//! mutex so a pool can be shared across threads.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::MotionEvent;
use crate::pointer::{PointerCoords, PointerProperties};

/// Default number of recycled events kept for reuse
pub const DEFAULT_POOL_CAPACITY: usize = 10;

const INITIAL_SCRATCH_CAPACITY: usize = 8;

/// Reusable per-pointer buffers
#[derive(Debug, Default)]
pub struct PointerScratch {
    pub properties: Vec<PointerProperties>,
    pub coords: Vec<PointerCoords>,
    pub index_map: Vec<usize>,
}

impl PointerScratch {
    /// Current slot count of every buffer
    pub fn capacity(&self) -> usize {
        self.coords.len()
    }

    /// Grow every buffer to at least `desired` slots, doubling from 8
    pub fn ensure_capacity(&mut self, desired: usize) {
        let current = self.capacity();
        if current >= desired {
            return;
        }

        let mut capacity = if current == 0 { INITIAL_SCRATCH_CAPACITY } else { current };
        while capacity < desired {
            capacity *= 2;
        }
        tracing::debug!("Growing pointer scratch buffers to {}", capacity);

        self.properties.resize(capacity, PointerProperties::default());
        self.coords.resize(capacity, PointerCoords::default());
        self.index_map.resize(capacity, 0);
    }
}

/// Owner of recycled events and shared scratch buffers
#[derive(Debug)]
pub struct EventPool {
    capacity: usize,
    free: Mutex<Vec<MotionEvent>>,
    scratch: Mutex<PointerScratch>,
    next_id: AtomicI32,
}

impl Default for EventPool {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(Vec::with_capacity(capacity)),
            scratch: Mutex::new(PointerScratch::default()),
            next_id: AtomicI32::new(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events currently waiting for reuse
    pub fn recycled_count(&self) -> usize {
        lock(&self.free).len()
    }

    /// A recycled event if one is available, otherwise a fresh one
    pub(crate) fn take(&self) -> MotionEvent {
        lock(&self.free).pop().unwrap_or_default()
    }

    /// Return an event for reuse; dropped when the pool is full
    pub fn recycle(&self, event: MotionEvent) {
        let mut free = lock(&self.free);
        if free.len() < self.capacity {
            free.push(event);
        } else {
            tracing::debug!("Event pool full ({}), dropping recycled event", self.capacity);
        }
    }

    /// Next event id
    pub(crate) fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Run `f` with scratch buffers holding at least `pointer_count` slots
    pub(crate) fn with_scratch<R>(&self, pointer_count: usize, f: impl FnOnce(&mut PointerScratch) -> R) -> R {
        let mut scratch = lock(&self.scratch);
        scratch.ensure_capacity(pointer_count);
        f(&mut scratch)
    }
}
