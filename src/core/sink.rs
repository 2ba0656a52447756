//! Sink capability and the serializing wrapper around sink backends
//!
//! A [`Sink`] is what a logger delivers records to. Concrete destinations
//! implement the much smaller [`SinkBackend`] trait and get wrapped in a
//! [`SerializedSink`], which owns the backend together with a private
//! formatter and serializes every call behind one lock. Backends therefore
//! need no internal locking even when several worker threads or several
//! loggers share the sink.

use super::error::Result;
use super::formatter::{Formatter, PatternFormatter};
use super::log_level::{AtomicLevel, LogLevel};
use super::log_record::LogRecord;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::Arc;

/// Destination for log records
pub trait Sink {
    fn log(&self, record: &LogRecord) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn set_pattern(&self, pattern: &str);
    fn set_formatter(&self, formatter: Box<dyn Formatter>);

    /// Per-sink level gate
    fn level_gate(&self) -> &AtomicLevel;

    /// Name used when reporting this sink's errors
    fn name(&self) -> &str {
        "sink"
    }

    fn set_level(&self, level: LogLevel) {
        self.level_gate().store(level);
    }

    fn level(&self) -> LogLevel {
        self.level_gate().load()
    }

    fn should_log(&self, level: LogLevel) -> bool {
        self.level_gate().admits(level)
    }
}

/// Shared handle to a sink usable from any worker thread
pub type SinkRef = Arc<dyn Sink + Send + Sync>;

/// A concrete output, called with the lock of its [`SerializedSink`] held
pub trait SinkBackend {
    /// Write one already-formatted record
    fn write(&mut self, record: &LogRecord, formatted: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    fn name(&self) -> &str {
        "sink"
    }
}

/// Exclusive access to a value through a shared reference
pub trait Exclusive<T> {
    fn new(value: T) -> Self;
    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> Exclusive<T> for Mutex<T> {
    fn new(value: T) -> Self {
        Mutex::new(value)
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<T> Exclusive<T> for RefCell<T> {
    fn new(value: T) -> Self {
        RefCell::new(value)
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// Chooses the exclusion primitive of a [`SerializedSink`] at compile time
pub trait LockStrategy {
    type Cell<T>: Exclusive<T>;
}

/// Real mutex; the sink is `Sync` and can be shared by worker threads
#[derive(Debug, Clone, Copy, Default)]
pub struct Threaded;

/// No locking; the sink is `!Sync` and confined to one thread at a time
///
/// Such a sink cannot be handed to a logger, whose sinks are shared with the
/// worker threads:
///
/// ```compile_fail
/// use rust_async_logger::sinks::NullBackend;
/// use rust_async_logger::{SerializedSink, SingleThreaded, SinkRef};
/// use std::sync::Arc;
///
/// let sink: SinkRef = Arc::new(SerializedSink::<NullBackend, SingleThreaded>::new(NullBackend));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleThreaded;

impl LockStrategy for Threaded {
    type Cell<T> = Mutex<T>;
}

impl LockStrategy for SingleThreaded {
    type Cell<T> = RefCell<T>;
}

struct SinkState<B> {
    backend: B,
    formatter: Box<dyn Formatter>,
    buffer: Vec<u8>,
}

/// A sink backend plus its own formatter, serialized behind one lock
pub struct SerializedSink<B, L: LockStrategy = Threaded> {
    state: L::Cell<SinkState<B>>,
    level: AtomicLevel,
    name: String,
}

impl<B: SinkBackend, L: LockStrategy> SerializedSink<B, L> {
    pub fn new(backend: B) -> Self {
        Self::with_formatter(backend, Box::new(PatternFormatter::default()))
    }

    pub fn with_formatter(backend: B, formatter: Box<dyn Formatter>) -> Self {
        let name = backend.name().to_string();
        Self {
            state: Exclusive::new(SinkState {
                backend,
                formatter,
                buffer: Vec::with_capacity(256),
            }),
            level: AtomicLevel::default(),
            name,
        }
    }

    /// Set the level gate, builder style
    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.level.store(level);
        self
    }

    /// Run `f` against the backend while holding the sink's lock
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        self.state.with(|state| f(&mut state.backend))
    }
}

impl<B: SinkBackend, L: LockStrategy> Sink for SerializedSink<B, L> {
    fn log(&self, record: &LogRecord) -> Result<()> {
        self.state.with(|state| {
            let SinkState {
                backend,
                formatter,
                buffer,
            } = state;
            buffer.clear();
            formatter.render(record, buffer);
            backend.write(record, buffer)
        })
    }

    fn flush(&self) -> Result<()> {
        self.state.with(|state| state.backend.flush())
    }

    fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.state.with(|state| state.formatter = formatter);
    }

    fn level_gate(&self) -> &AtomicLevel {
        &self.level
    }

    fn name(&self) -> &str {
        &self.name
    }
}
