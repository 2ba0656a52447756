//! Handling of delivery errors raised by sinks
//!
//! Errors from a sink never reach the worker loop. They are handed to the
//! owning logger's [`ErrorHandler`]; without a custom handler they go to
//! stderr, at most once per second for the whole process.

use super::error::LoggerError;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback receiving the logger name and the error raised by one of its sinks
pub type ErrorHandler = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

/// Minimum spacing between two reports of the default handler
pub const ERROR_REPORT_INTERVAL: Duration = Duration::from_secs(1);

struct ReportState {
    last_report: Option<Instant>,
    error_count: u64,
}

static REPORT_STATE: Mutex<ReportState> = Mutex::new(ReportState {
    last_report: None,
    error_count: 0,
});

/// Format a report line, or `None` when rate limiting suppresses it
fn next_report(state: &mut ReportState, now: Instant, logger: &str, err: &LoggerError) -> Option<String> {
    state.error_count += 1;
    if let Some(last) = state.last_report {
        if now.duration_since(last) < ERROR_REPORT_INTERVAL {
            return None;
        }
    }
    state.last_report = Some(now);
    Some(format!(
        "[*** LOG ERROR #{:04} ***] [{}] [{}] {}",
        state.error_count,
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        logger,
        err
    ))
}

/// Process-wide default: rate-limited report on stderr
pub fn default_error_handler(logger: &str, err: &LoggerError) {
    let report = {
        let mut state = REPORT_STATE.lock();
        next_report(&mut state, Instant::now(), logger, err)
    };
    if let Some(line) = report {
        eprintln!("{}", line);
    }
}
