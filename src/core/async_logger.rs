//! Asynchronous logger front-end
//!
//! An [`AsyncLogger`] filters records on the calling thread and hands the
//! survivors to a shared [`WorkerPool`], whose workers deliver them to the
//! logger's sinks. The logger only keeps a weak reference to its pool:
//! logging through a logger that outlived its pool is an error, never a
//! silent drop.

use super::backtrace::BacktraceBuffer;
use super::error::{LoggerError, Result};
use super::error_handler::{default_error_handler, ErrorHandler};
use super::formatter::Formatter;
use super::log_level::{AtomicLevel, LogLevel};
use super::log_record::{LogRecord, SourceLocation};
use super::overflow_policy::OverflowPolicy;
use super::sink::SinkRef;
use super::worker_pool::WorkerPool;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

const BACKTRACE_START: &str = "****************** Backtrace Start ******************";
const BACKTRACE_END: &str = "****************** Backtrace End ********************";

pub struct AsyncLogger {
    name: Arc<str>,
    sinks: Arc<[SinkRef]>,
    level: AtomicLevel,
    flush_level: AtomicLevel,
    overflow_policy: OverflowPolicy,
    pool: Weak<WorkerPool>,
    backtrace: BacktraceBuffer,
    error_handler: RwLock<Option<ErrorHandler>>,
}

impl AsyncLogger {
    /// Create a logger posting to `pool` with default levels and no error handler
    pub fn new(
        name: impl Into<String>,
        sinks: Vec<SinkRef>,
        pool: &Arc<WorkerPool>,
        overflow_policy: OverflowPolicy,
    ) -> Arc<Self> {
        Self::builder(name, pool)
            .sinks(sinks)
            .overflow_policy(overflow_policy)
            .build()
    }

    #[must_use]
    pub fn builder(name: impl Into<String>, pool: &Arc<WorkerPool>) -> AsyncLoggerBuilder {
        AsyncLoggerBuilder::new(name, pool)
    }

    pub fn log(self: &Arc<Self>, level: LogLevel, message: impl Into<String>) -> Result<()> {
        if !self.wants(level) {
            return Ok(());
        }
        self.log_record(LogRecord::new(Arc::clone(&self.name), level, message))
    }

    /// Log with a call-site location, formatting the message only if some
    /// gate admits it
    pub fn log_at(
        self: &Arc<Self>,
        location: SourceLocation,
        level: LogLevel,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        if !self.wants(level) {
            return Ok(());
        }
        let record = LogRecord::new(Arc::clone(&self.name), level, fmt::format(args))
            .with_location(location);
        self.log_record(record)
    }

    /// Submit an already-built record
    ///
    /// The record is posted when it passes the logger's level gate and copied
    /// into the backtrace buffer when capture is enabled. Either path needs a
    /// live pool.
    pub fn log_record(self: &Arc<Self>, record: LogRecord) -> Result<()> {
        let log_enabled = self.should_log(record.level);
        let traceback_enabled = self.backtrace.enabled();
        if !log_enabled && !traceback_enabled {
            return Ok(());
        }

        let pool = self.upgrade_pool("log")?;
        if traceback_enabled {
            self.backtrace.push(record.clone());
        }
        if log_enabled {
            pool.post_log(Arc::clone(self), record, self.overflow_policy);
        }
        Ok(())
    }

    pub fn trace(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    pub fn critical(self: &Arc<Self>, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Critical, message)
    }

    /// Queue a flush of every sink behind the records already posted
    pub fn flush(self: &Arc<Self>) -> Result<()> {
        let pool = self.upgrade_pool("flush")?;
        pool.post_flush(Arc::clone(self), self.overflow_policy);
        Ok(())
    }

    /// Post the retained backtrace, framed by start and end banners
    ///
    /// Does nothing when capture is disabled or nothing was retained.
    pub fn dump_backtrace(self: &Arc<Self>) -> Result<()> {
        if !self.backtrace.enabled() || self.backtrace.is_empty() {
            return Ok(());
        }
        let pool = self.upgrade_pool("dump_backtrace")?;

        let mut retained = Vec::with_capacity(self.backtrace.len());
        self.backtrace.drain_and_apply(|record| retained.push(record));

        let banner = |text: &str| LogRecord::new(Arc::clone(&self.name), LogLevel::Info, text);
        pool.post_log(Arc::clone(self), banner(BACKTRACE_START), self.overflow_policy);
        for record in retained {
            pool.post_log(Arc::clone(self), record, self.overflow_policy);
        }
        pool.post_log(Arc::clone(self), banner(BACKTRACE_END), self.overflow_policy);
        Ok(())
    }

    /// A logger sharing this one's sinks, pool, levels and backtrace contents
    /// under a different name
    pub fn clone_with_name(&self, new_name: impl Into<String>) -> Arc<Self> {
        let new_name: String = new_name.into();
        Arc::new(Self {
            name: Arc::from(new_name),
            sinks: Arc::clone(&self.sinks),
            level: self.level.clone(),
            flush_level: self.flush_level.clone(),
            overflow_policy: self.overflow_policy,
            pool: Weak::clone(&self.pool),
            backtrace: self.backtrace.clone(),
            error_handler: RwLock::new(self.error_handler.read().clone()),
        })
    }

    /// Deliver one record to every admitting sink; runs on a worker thread
    pub(crate) fn backend_log(&self, record: &LogRecord) {
        for sink in self.sinks.iter() {
            if !sink.should_log(record.level) {
                continue;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.log(record)));
            self.report(sink.name(), outcome);
        }

        if self.flush_level.admits(record.level) {
            self.backend_flush();
        }
    }

    /// Flush every sink; runs on a worker thread
    pub(crate) fn backend_flush(&self) {
        for sink in self.sinks.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.flush()));
            self.report(sink.name(), outcome);
        }
    }

    fn report(&self, sink: &str, outcome: std::thread::Result<Result<()>>) {
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.handle_error(&err),
            Err(payload) => {
                let err = LoggerError::sink_panicked(sink, panic_message(payload.as_ref()));
                self.handle_error(&err);
            }
        }
    }

    fn handle_error(&self, err: &LoggerError) {
        let handler = self.error_handler.read().clone();
        match handler {
            Some(handler) => handler(&self.name, err),
            None => default_error_handler(&self.name, err),
        }
    }

    fn upgrade_pool(&self, operation: &str) -> Result<Arc<WorkerPool>> {
        self.pool
            .upgrade()
            .ok_or_else(|| LoggerError::pool_unavailable(self.name.as_ref(), operation))
    }

    #[inline]
    fn wants(&self, level: LogLevel) -> bool {
        self.should_log(level) || self.backtrace.enabled()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &[SinkRef] {
        &self.sinks
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    pub fn level(&self) -> LogLevel {
        self.level.load()
    }

    #[inline]
    pub fn should_log(&self, level: LogLevel) -> bool {
        self.level.admits(level)
    }

    /// Flush all sinks after delivering any record at `level` or above
    pub fn flush_on(&self, level: LogLevel) {
        self.flush_level.store(level);
    }

    pub fn flush_level(&self) -> LogLevel {
        self.flush_level.load()
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        *self.error_handler.write() = Some(handler);
    }

    /// Give every sink its own pattern formatter built from `pattern`
    pub fn set_pattern(&self, pattern: &str) {
        for sink in self.sinks.iter() {
            sink.set_pattern(pattern);
        }
    }

    /// Give every sink its own copy of `formatter`
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        for sink in self.sinks.iter() {
            sink.set_formatter(formatter.clone_box());
        }
    }

    pub fn enable_backtrace(&self, capacity: usize) {
        self.backtrace.enable(capacity);
    }

    pub fn disable_backtrace(&self) {
        self.backtrace.disable();
    }

    pub fn should_backtrace(&self) -> bool {
        self.backtrace.enabled()
    }
}

impl fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("name", &self.name)
            .field("sinks", &self.sinks.len())
            .field("level", &self.level())
            .field("flush_level", &self.flush_level())
            .field("overflow_policy", &self.overflow_policy)
            .field("backtrace", &self.should_backtrace())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for [`AsyncLogger`]
///
/// # Example
///
/// ```
/// use rust_async_logger::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(WorkerPool::builder().threads(1).build().unwrap());
/// let sink: SinkRef = Arc::new(SerializedSink::<NullBackend>::new(NullBackend));
/// let logger = AsyncLogger::builder("app", &pool)
///     .sink(sink)
///     .level(LogLevel::Debug)
///     .flush_level(LogLevel::Error)
///     .overflow_policy(OverflowPolicy::OverrunOldest)
///     .build();
///
/// logger.debug("ready").unwrap();
/// assert_eq!(logger.flush_level(), LogLevel::Error);
/// ```
pub struct AsyncLoggerBuilder {
    name: String,
    pool: Weak<WorkerPool>,
    sinks: Vec<SinkRef>,
    level: LogLevel,
    flush_level: LogLevel,
    overflow_policy: OverflowPolicy,
    error_handler: Option<ErrorHandler>,
    backtrace: Option<usize>,
}

impl AsyncLoggerBuilder {
    pub fn new(name: impl Into<String>, pool: &Arc<WorkerPool>) -> Self {
        Self {
            name: name.into(),
            pool: Arc::downgrade(pool),
            sinks: Vec::new(),
            level: LogLevel::Info,
            flush_level: LogLevel::Off,
            overflow_policy: OverflowPolicy::default(),
            error_handler: None,
            backtrace: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: SinkRef) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = SinkRef>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_level(mut self, level: LogLevel) -> Self {
        self.flush_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Retain the last `capacity` records for [`AsyncLogger::dump_backtrace`]
    #[must_use = "builder methods return a new value"]
    pub fn backtrace(mut self, capacity: usize) -> Self {
        self.backtrace = Some(capacity);
        self
    }

    pub fn build(self) -> Arc<AsyncLogger> {
        let backtrace = BacktraceBuffer::new();
        if let Some(capacity) = self.backtrace {
            backtrace.enable(capacity);
        }
        Arc::new(AsyncLogger {
            name: Arc::from(self.name),
            sinks: self.sinks.into(),
            level: AtomicLevel::new(self.level),
            flush_level: AtomicLevel::new(self.flush_level),
            overflow_policy: self.overflow_policy,
            pool: self.pool,
            backtrace,
            error_handler: RwLock::new(self.error_handler),
        })
    }
}
