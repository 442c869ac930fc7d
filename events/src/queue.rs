use crate::AgentEvent;
use log::*;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// In-memory FIFO buffer between event producers and the stream consumer.
///
/// Any number of producers may `emit` concurrently with a `drain`. Each
/// operation takes the lock for a single push or pop, so events are never
/// lost, duplicated or reordered relative to their emit order.
///
/// With a capacity set, emitting into a full queue drops the oldest event.
/// Without one the queue grows without bound.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<AgentEvent>>,
    capacity: Option<usize>,
    wakeup: Notify,
}

impl EventQueue {
    /// Creates an unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue that holds at most `capacity` events (minimum 1).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Append `event` to the tail of the queue and wake a waiting consumer.
    pub fn emit(&self, event: AgentEvent) {
        {
            let mut events = self.lock();
            if let Some(capacity) = self.capacity {
                while events.len() >= capacity {
                    if let Some(dropped) = events.pop_front() {
                        warn!(
                            capacity = capacity,
                            event_type = dropped.kind().as_str();
                            "event queue full, dropped oldest event"
                        );
                    }
                }
            }
            events.push_back(event);
        }

        trace!("Queued agent event");
        self.wakeup.notify_one();
    }

    /// Removes and yields the events queued at the time of the call, in FIFO order.
    ///
    /// The iterator is lazy: each `next()` pops one event. It yields at most
    /// as many events as were queued when `drain` was called, so it ends even
    /// while producers keep emitting. Later emits are left for the next drain.
    pub fn drain(&self) -> Drain<'_> {
        Drain {
            queue: self,
            remaining: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Completes once an `emit` happens. An emit that lands before this is
    /// awaited still counts, so a consumer that drained to empty and then
    /// waits cannot miss it.
    pub async fn notified(&self) {
        self.wakeup.notified().await;
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AgentEvent>> {
        // No invariant spans more than one push or pop, so a poisoned lock still holds a valid queue.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lazy draining iterator returned by [`EventQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a EventQueue,
    remaining: usize,
}

impl Iterator for Drain<'_> {
    type Item = AgentEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.queue.lock().pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
