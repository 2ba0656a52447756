//! Logging macros for ergonomic log message formatting.
//!
//! These macros take an `Arc<AsyncLogger>` (or a reference to one), format
//! their arguments like `format!`, and record the call site's file, line and
//! module. Each one evaluates to the logger's `Result<()>`, so a logger that
//! outlived its worker pool can be noticed with `?`.
//!
//! The message is only formatted when the logger's level gate admits the
//! record or backtrace capture is enabled.
//!
//! # Examples
//!
//! ```
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::{info, warn};
//! use std::sync::Arc;
//!
//! let pool = Arc::new(WorkerPool::builder().build().unwrap());
//! let logger = AsyncLogger::builder("server", &pool).build();
//!
//! info!(logger, "Server started").unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port).unwrap();
//! warn!(logger, "Retry attempt {} of {}", 3, 5).unwrap();
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_async_logger::prelude::*;
/// # use std::sync::Arc;
/// # let pool = Arc::new(WorkerPool::builder().build().unwrap());
/// # let logger = AsyncLogger::builder("app", &pool).build();
/// use rust_async_logger::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at(
            $crate::SourceLocation::new(file!(), line!(), module_path!()),
            $level,
            format_args!($($arg)+),
        )
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use rust_async_logger::prelude::*;
/// # use std::sync::Arc;
/// # let pool = Arc::new(WorkerPool::builder().build().unwrap());
/// # let logger = AsyncLogger::builder("app", &pool).build();
/// use rust_async_logger::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full").unwrap();
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{AsyncLogger, LogLevel, LoggerError, Sink, SinkRef, WorkerPool};
    use crate::sinks::{RingBufferBackend, RingBufferSink};
    use std::sync::Arc;

    /// Run `body` against a Trace-level logger and return the delivered lines
    fn capture(body: impl FnOnce(&Arc<AsyncLogger>)) -> Vec<String> {
        let sink = Arc::new(RingBufferSink::new(RingBufferBackend::new(32)));
        sink.set_pattern("%L %v @%s");
        let pool = Arc::new(WorkerPool::new(32, 1, None).unwrap());
        let logger = AsyncLogger::builder("macros", &pool)
            .sink(Arc::clone(&sink) as SinkRef)
            .level(LogLevel::Trace)
            .build();

        body(&logger);
        // Dropping the pool drains the queue before joining the worker
        drop(pool);
        sink.with_backend(|backend| backend.last_formatted(0))
    }

    #[test]
    fn test_level_macros() {
        let lines = capture(|logger| {
            trace!(logger, "t {}", 1).unwrap();
            debug!(logger, "d").unwrap();
            info!(logger, "i {}-{}", "a", 2).unwrap();
            warn!(logger, "w").unwrap();
            error!(logger, "e").unwrap();
            critical!(logger, "c").unwrap();
            log!(logger, LogLevel::Info, "explicit {}", 42).unwrap();
        });

        assert_eq!(
            lines,
            vec![
                "T t 1 @macros.rs\n",
                "D d @macros.rs\n",
                "I i a-2 @macros.rs\n",
                "W w @macros.rs\n",
                "E e @macros.rs\n",
                "C c @macros.rs\n",
                "I explicit 42 @macros.rs\n",
            ]
        );
    }

    #[test]
    fn test_macro_reports_expired_pool() {
        let pool = Arc::new(WorkerPool::new(8, 1, None).unwrap());
        let logger = AsyncLogger::builder("late", &pool).build();
        drop(pool);

        let result = info!(logger, "nobody listens");
        assert!(matches!(result, Err(LoggerError::PoolUnavailable { .. })));
        // Below the logger level nothing is attempted
        assert!(debug!(logger, "filtered").is_ok());
    }
}
