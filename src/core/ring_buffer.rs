//! Fixed-capacity ring buffer with overwrite-oldest semantics

use std::collections::VecDeque;

/// Fixed-capacity FIFO that overwrites its oldest element when full
///
/// Every overwrite bumps a monotonic overrun counter. A buffer created with
/// capacity 0 stays empty and ignores pushes. Not synchronized; callers
/// provide their own locking.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
    overrun_counter: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            overrun_counter: 0,
        }
    }

    /// Append an item, evicting the oldest one if the buffer is full
    pub fn push_back(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
            self.overrun_counter += 1;
        }
        self.items.push_back(item);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Item at position `index`, counted from the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Always false for a zero-capacity buffer, so producers never wait on it
    #[inline]
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.items.len() == self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn overrun_counter(&self) -> usize {
        self.overrun_counter
    }

    pub fn reset_overrun_counter(&mut self) {
        self.overrun_counter = 0;
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(0)
    }
}
