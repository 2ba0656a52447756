//! # Rust Async Logger
//!
//! Asynchronous log delivery: loggers filter records on the calling thread
//! and post them to a shared pool of worker threads, which write them to
//! sinks.
//!
//! ## Features
//!
//! - **Bounded queue**: one fixed-capacity queue per pool, with a choice of
//!   blocking, overwriting the oldest message, or discarding the new one when
//!   it is full
//! - **Shared sinks**: every sink is serialized behind its own lock and owns
//!   its own formatter, so loggers and workers can share it freely
//! - **Fault isolation**: errors and panics in a sink are reported to an
//!   error handler and never stop delivery to the other sinks
//! - **Backtrace**: keep the last N records of any level and dump them on
//!   demand
//!
//! ## Example
//!
//! ```
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::info;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(WorkerPool::builder().threads(1).build()?);
//! let sink: SinkRef = Arc::new(RingBufferSink::new(RingBufferBackend::new(16)));
//! let logger = AsyncLogger::builder("app", &pool).sink(sink).build();
//!
//! info!(logger, "listening on port {}", 8080)?;
//! logger.flush()?;
//! # Ok::<(), rust_async_logger::LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::{ConsoleBackend, ConsoleSink, ConsoleTarget};
    #[cfg(feature = "file")]
    pub use crate::sinks::{FileBackend, FileSink};
    pub use crate::sinks::{NullBackend, NullSink, RingBufferBackend, RingBufferSink};
    pub use crate::core::{
        AsyncLogger, AsyncLoggerBuilder, ErrorHandler, Formatter, JsonFormatter, LogLevel,
        LogRecord, LoggerError, OverflowPolicy, PatternFormatter, Result, SerializedSink,
        SingleThreaded, Sink, SinkBackend, SinkRef, SourceLocation, Threaded, WorkerPool,
        WorkerPoolBuilder, WorkerPoolConfig,
    };
}

pub use crate::core::{
    AsyncLogger, AsyncLoggerBuilder, AsyncMessage, AtomicLevel, BacktraceBuffer, BoundedQueue,
    ErrorHandler, Formatter, JsonFormatter, LogLevel, LogRecord, LoggerError, OverflowPolicy,
    PatternFormatter, Result, RingBuffer, SerializedSink, SingleThreaded, Sink, SinkBackend,
    SinkRef, SourceLocation, Threaded, WorkerPool, WorkerPoolBuilder, WorkerPoolConfig,
    DEFAULT_QUEUE_CAPACITY, MAX_THREADS,
};
