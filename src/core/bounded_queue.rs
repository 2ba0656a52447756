//! Multi-producer/multi-consumer blocking queue
//!
//! - [`BoundedQueue::enqueue`] blocks until there is room for the new item.
//! - [`BoundedQueue::enqueue_nowait`] never blocks; a full queue drops its oldest item.
//! - [`BoundedQueue::try_enqueue`] never blocks; a full queue rejects the new item.
//! - [`BoundedQueue::dequeue_for`] waits until an item arrives or the timeout passes.
//!
//! One mutex guards the ring buffer. Each successful operation wakes exactly one
//! peer: an insert wakes one consumer, a removal wakes one blocked producer.

use super::ring_buffer::RingBuffer;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub struct BoundedQueue<T> {
    ring: Mutex<RingBuffer<T>>,
    /// Signalled when an item is removed
    room_available: Condvar,
    /// Signalled when an item is inserted
    item_available: Condvar,
    discard_counter: AtomicUsize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(RingBuffer::new(capacity)),
            room_available: Condvar::new(),
            item_available: Condvar::new(),
            discard_counter: AtomicUsize::new(0),
        }
    }

    /// Insert `item`, blocking the caller while the queue is full
    pub fn enqueue(&self, item: T) {
        {
            let mut ring = self.ring.lock();
            self.room_available.wait_while(&mut ring, |ring| ring.is_full());
            ring.push_back(item);
        }
        self.item_available.notify_one();
    }

    /// Insert `item` immediately, overwriting the oldest entry if the queue is full
    pub fn enqueue_nowait(&self, item: T) {
        {
            let mut ring = self.ring.lock();
            ring.push_back(item);
        }
        self.item_available.notify_one();
    }

    /// Insert `item` only if there is room, handing it back otherwise
    pub fn try_enqueue(&self, item: T) -> Result<(), T> {
        {
            let mut ring = self.ring.lock();
            if ring.is_full() {
                drop(ring);
                self.discard_counter.fetch_add(1, Ordering::Relaxed);
                return Err(item);
            }
            ring.push_back(item);
        }
        self.item_available.notify_one();
        Ok(())
    }

    /// Remove the oldest item, waiting up to `timeout` for one to arrive
    ///
    /// Returns `None` only once `timeout` has fully elapsed with the queue empty.
    pub fn dequeue_for(&self, timeout: Duration) -> Option<T> {
        let item = {
            let mut ring = self.ring.lock();
            self.item_available
                .wait_while_for(&mut ring, |ring| ring.is_empty(), timeout);
            ring.pop_front()
        };
        if item.is_some() {
            self.room_available.notify_one();
        }
        item
    }

    pub fn overrun_counter(&self) -> usize {
        self.ring.lock().overrun_counter()
    }

    pub fn reset_overrun_counter(&self) {
        self.ring.lock().reset_overrun_counter();
    }

    /// Number of items rejected by [`BoundedQueue::try_enqueue`]
    pub fn discard_counter(&self) -> usize {
        self.discard_counter.load(Ordering::Relaxed)
    }

    pub fn reset_discard_counter(&self) {
        self.discard_counter.store(0, Ordering::Relaxed);
    }

    pub fn size(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(4);
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue_nowait(3);
        assert_eq!(queue.size(), 3);
        assert_eq!(queue.dequeue_for(Duration::ZERO), Some(1));
        assert_eq!(queue.dequeue_for(Duration::ZERO), Some(2));
        assert_eq!(queue.dequeue_for(Duration::ZERO), Some(3));
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn test_enqueue_nowait_overwrites_oldest() {
        let queue = BoundedQueue::new(3);
        for i in 0..7 {
            queue.enqueue_nowait(i);
        }
        assert_eq!(queue.overrun_counter(), 4);
        assert_eq!(queue.size(), 3);

        let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue_for(Duration::ZERO)).collect();
        assert_eq!(drained, vec![4, 5, 6]);

        queue.reset_overrun_counter();
        assert_eq!(queue.overrun_counter(), 0);
    }

    #[test]
    fn test_try_enqueue_rejects_when_full() {
        let queue = BoundedQueue::new(2);
        assert!(queue.try_enqueue("a").is_ok());
        assert!(queue.try_enqueue("b").is_ok());
        assert_eq!(queue.try_enqueue("c"), Err("c"));
        assert_eq!(queue.discard_counter(), 1);
        assert_eq!(queue.overrun_counter(), 0);
        assert_eq!(queue.dequeue_for(Duration::ZERO), Some("a"));
    }

    #[test]
    fn test_dequeue_for_waits_full_timeout() {
        let queue: BoundedQueue<u32> = BoundedQueue::new(1);
        let timeout = Duration::from_millis(50);
        let start = Instant::now();
        assert_eq!(queue.dequeue_for(timeout), None);
        assert!(start.elapsed() >= timeout);
    }

    #[test]
    fn test_dequeue_for_wakes_on_insert() {
        let queue = Arc::new(BoundedQueue::new(1));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.enqueue(99u32);
            })
        };
        assert_eq!(queue.dequeue_for(Duration::from_secs(5)), Some(99));
        producer.join().unwrap();
    }

    #[test]
    fn test_enqueue_blocks_until_room() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.enqueue(1u32);

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.enqueue(2);
                Instant::now()
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.size(), 1, "blocked producer must not exceed capacity");
        let released_at = Instant::now();
        assert_eq!(queue.dequeue_for(Duration::ZERO), Some(1));

        let inserted_at = producer.join().unwrap();
        assert!(inserted_at >= released_at);
        assert_eq!(queue.dequeue_for(Duration::from_secs(1)), Some(2));
        assert_eq!(queue.overrun_counter(), 0);
    }
}
