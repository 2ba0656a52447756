//! Bounded retention of recent records for on-demand dump
//!
//! While enabled, a logger copies every record it sees into this buffer,
//! regardless of level. Dumping drains the buffer oldest-first, which makes
//! it useful for keeping debug detail around until an error shows up.

use super::log_record::LogRecord;
use super::ring_buffer::RingBuffer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct BacktraceBuffer {
    enabled: AtomicBool,
    records: Mutex<RingBuffer<LogRecord>>,
}

impl BacktraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start retaining up to `capacity` records, discarding anything held before
    pub fn enable(&self, capacity: usize) {
        let mut records = self.records.lock();
        self.enabled.store(true, Ordering::Relaxed);
        *records = RingBuffer::new(capacity);
    }

    /// Stop retaining; records already held stay until the next enable or dump
    pub fn disable(&self) {
        let _records = self.records.lock();
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Lock-free check, done for every logged record
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn push(&self, record: LogRecord) {
        self.records.lock().push_back(record);
    }

    /// Pop every record oldest-first and hand it to `visitor`
    ///
    /// The buffer's lock is held while `visitor` runs, so the visitor must not
    /// call back into this buffer.
    pub fn drain_and_apply(&self, mut visitor: impl FnMut(LogRecord)) {
        let mut records = self.records.lock();
        while let Some(record) = records.pop_front() {
            visitor(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.lock().capacity()
    }
}

impl Clone for BacktraceBuffer {
    /// Snapshot the flag and the contents under the source's lock
    fn clone(&self) -> Self {
        let records = self.records.lock();
        Self {
            enabled: AtomicBool::new(self.enabled()),
            records: Mutex::new(records.clone()),
        }
    }
}
