//! Lossy single-producer/single-consumer event queue.
//!
//! One interrupt-level producer, one foreground consumer. The ring itself is
//! `heapless::spsc::Queue`, which keeps one slot free and so holds `N - 1`
//! entries; it sits behind an [`IrqLock`] so both sides reach it through
//! `&self`. Pushing onto a full queue drops the new value.

use heapless::spsc::Queue;

use crate::sync::{IrqControl, IrqLock};

pub struct EventFifo<T, I: IrqControl, const N: usize> {
    queue: IrqLock<Queue<T, N>, I>,
}

impl<T, I: IrqControl, const N: usize> EventFifo<T, I, N> {
    const VALID_CAPACITY: () = assert!(N >= 2 && N <= 255, "EventFifo capacity must be 2..=255");

    pub const fn new() -> Self {
        let () = Self::VALID_CAPACITY;
        Self {
            queue: IrqLock::new(Queue::new()),
        }
    }

    /// Usable entries (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Producer side. Returns `false` when the value was dropped.
    pub fn push(&self, value: T) -> bool {
        self.queue
            .with(|queue| queue.enqueue(value).is_ok())
            .unwrap_or(false)
    }

    /// Consumer side. Never blocks.
    pub fn pop(&self) -> Option<T> {
        self.queue.with(|queue| queue.dequeue()).flatten()
    }

    /// Entries waiting to be popped.
    pub fn len(&self) -> usize {
        self.queue.with(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }

    /// Discard everything currently queued.
    pub fn clear(&self) {
        self.queue.with(|queue| while queue.dequeue().is_some() {});
    }
}

impl<T, I: IrqControl, const N: usize> Default for EventFifo<T, I, N> {
    fn default() -> Self {
        Self::new()
    }
}
