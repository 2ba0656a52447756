//! In-memory backend keeping the most recent records
//!
//! Useful for showing recent activity in a status page, or for asserting on
//! output in tests.

use crate::core::{LogRecord, Result, RingBuffer, SerializedSink, SingleThreaded, SinkBackend};

#[derive(Debug, Clone)]
struct Retained {
    record: LogRecord,
    formatted: String,
}

#[derive(Debug, Clone)]
pub struct RingBufferBackend {
    retained: RingBuffer<Retained>,
}

impl RingBufferBackend {
    pub fn new(capacity: usize) -> Self {
        Self {
            retained: RingBuffer::new(capacity),
        }
    }

    /// The newest `limit` formatted lines, oldest first; `0` means all of them
    pub fn last_formatted(&self, limit: usize) -> Vec<String> {
        self.tail(limit).map(|r| r.formatted.clone()).collect()
    }

    /// The newest `limit` records, oldest first; `0` means all of them
    pub fn last_records(&self, limit: usize) -> Vec<LogRecord> {
        self.tail(limit).map(|r| r.record.clone()).collect()
    }

    fn tail(&self, limit: usize) -> impl Iterator<Item = &Retained> {
        let len = self.retained.len();
        let skip = if limit == 0 { 0 } else { len.saturating_sub(limit) };
        self.retained.iter().skip(skip)
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Records evicted to make room for newer ones
    pub fn evicted(&self) -> usize {
        self.retained.overrun_counter()
    }
}

impl SinkBackend for RingBufferBackend {
    fn write(&mut self, record: &LogRecord, formatted: &[u8]) -> Result<()> {
        self.retained.push_back(Retained {
            record: record.clone(),
            formatted: String::from_utf8_lossy(formatted).into_owned(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "ring_buffer"
    }
}

pub type RingBufferSink = SerializedSink<RingBufferBackend>;
pub type RingBufferSinkSt = SerializedSink<RingBufferBackend, SingleThreaded>;
