//! Core engine: records, levels, queueing, worker pool and sinks

pub mod async_logger;
pub mod backtrace;
pub mod bounded_queue;
pub mod error;
pub mod error_handler;
pub mod formatter;
pub mod json_formatter;
pub mod log_level;
pub mod log_record;
pub mod overflow_policy;
pub mod ring_buffer;
pub mod sink;
pub mod worker_pool;

pub use async_logger::{AsyncLogger, AsyncLoggerBuilder};
pub use backtrace::BacktraceBuffer;
pub use bounded_queue::BoundedQueue;
pub use error::{LoggerError, Result};
pub use error_handler::{default_error_handler, ErrorHandler, ERROR_REPORT_INTERVAL};
pub use formatter::{Formatter, PatternFormatter, DEFAULT_PATTERN};
pub use json_formatter::JsonFormatter;
pub use log_level::{AtomicLevel, LogLevel};
pub use log_record::{LogRecord, SourceLocation};
pub use overflow_policy::OverflowPolicy;
pub use ring_buffer::RingBuffer;
pub use sink::{
    Exclusive, LockStrategy, SerializedSink, SingleThreaded, Sink, SinkBackend, SinkRef, Threaded,
};
pub use worker_pool::{
    AsyncMessage, ThreadHook, WorkerPool, WorkerPoolBuilder, WorkerPoolConfig,
    DEFAULT_QUEUE_CAPACITY, MAX_THREADS, WORKER_WAIT_TIMEOUT,
};
