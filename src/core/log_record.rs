//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

// Thread-local caches for thread information to avoid repeated formatting
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<Arc<str>>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<Arc<str>>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn current_thread_id() -> Arc<str> {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| Arc::from(format!("{:?}", std::thread::current().id())))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn current_thread_name() -> Option<Arc<str>> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(Arc::from))
            .clone()
    })
}

/// Call-site location of a log statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32, module_path: &'static str) -> Self {
        Self {
            file,
            line,
            module_path,
        }
    }

    /// File name without its directory components
    pub fn file_name(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Immutable log record handed from the call site to the sinks
///
/// The payload is owned, so a record can sit in the worker queue or the
/// backtrace buffer long after the producing stack frame is gone. Cloning
/// is cheap for the logger name and thread id, which are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub logger_name: Arc<str>,
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub location: Option<SourceLocation>,
    pub payload: String,
    pub thread_id: Arc<str>,
    pub thread_name: Option<Arc<str>>,
}

impl LogRecord {
    pub fn new(logger_name: Arc<str>, level: LogLevel, payload: impl Into<String>) -> Self {
        Self {
            logger_name,
            level,
            timestamp: Utc::now(),
            location: None,
            payload: payload.into(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Thread name when the producing thread has one, its id otherwise
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}
