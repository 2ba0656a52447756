//! Overflow policies for the async logging queue
//!
//! When the worker pool's queue is full, the policy decides whether the
//! producer waits, the oldest queued message is overwritten, or the new
//! message is discarded. Overflow is never reported as an error; it is only
//! observable through the pool's counters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy for handling queue overflow in async logging
///
/// # Example
///
/// ```
/// use rust_async_logger::OverflowPolicy;
///
/// // Default behavior: apply backpressure to the producer
/// assert_eq!(OverflowPolicy::default(), OverflowPolicy::Block);
///
/// let policy: OverflowPolicy = "overrun_oldest".parse().unwrap();
/// assert_eq!(policy, OverflowPolicy::OverrunOldest);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Block until space is available
    ///
    /// No message is ever lost, at the cost of stalling the logging thread
    /// while the workers catch up.
    #[default]
    Block,

    /// Overwrite the oldest queued message
    ///
    /// The producer never waits. Each overwrite increments the pool's
    /// overrun counter.
    OverrunOldest,

    /// Drop the new message
    ///
    /// The producer never waits. Each drop increments the pool's discard
    /// counter.
    DiscardNew,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::OverrunOldest => write!(f, "OverrunOldest"),
            OverflowPolicy::DiscardNew => write!(f, "DiscardNew"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "overrunoldest" | "overwrite" => Ok(OverflowPolicy::OverrunOldest),
            "discardnew" | "dropnewest" => Ok(OverflowPolicy::DiscardNew),
            _ => Err(format!("Invalid overflow policy: '{}'", s)),
        }
    }
}
