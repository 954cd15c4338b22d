//! Bounded event queue owned by the window layer.
//!
//! The event loop pushes window events as they arrive; the application
//! drains them once per frame in [`crate::flow::Application::update`].

use std::collections::VecDeque;

/// FIFO with a fixed capacity. When full, pushing drops the oldest event.
#[derive(Debug)]
pub struct EventQueue<E> {
    events: VecDeque<E>,
    capacity: usize,
    dropped: u64,
    overflowing: bool,
}

impl<E> EventQueue<E> {
    pub fn new(capacity: usize) -> Self {
        crate::require!(capacity > 0, "event queue capacity must be at least 1");
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
            overflowing: false,
        }
    }

    pub fn push(&mut self, event: E) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            if !self.overflowing {
                log::warn!(
                    "Event queue full ({} events), dropping the oldest until it is drained",
                    self.capacity
                );
                self.overflowing = true;
            }
        }
        self.events.push_back(event);
    }

    /// Oldest pending event.
    pub fn poll(&mut self) -> Option<E> {
        let event = self.events.pop_front();
        if self.events.is_empty() {
            self.overflowing = false;
        }
        event
    }

    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.overflowing = false;
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events lost to overflow since the queue was created.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_come_out_in_push_order() {
        let mut queue = EventQueue::new(4);
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.poll(), Some(1));
        assert_eq!(queue.drain().collect::<Vec<_>>(), vec![2, 3]);
        assert!(queue.is_empty());
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn overflow_drops_the_oldest() {
        let mut queue = EventQueue::new(2);
        for i in 0..5 {
            queue.push(i);
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 3);
        assert_eq!(queue.poll(), Some(3));
        assert_eq!(queue.poll(), Some(4));
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn zero_capacity_is_fatal() {
        EventQueue::<u32>::new(0);
    }
}
