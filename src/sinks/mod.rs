//! Sink backends
//!
//! Each backend implements [`SinkBackend`](crate::core::SinkBackend) and is
//! meant to be wrapped in a [`SerializedSink`](crate::core::SerializedSink).
//! The `*Sink` aliases pick the thread-safe wrapper, the `*SinkSt` aliases
//! the single-threaded one.

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod null;
pub mod ring_buffer;

#[cfg(feature = "console")]
pub use console::{ConsoleBackend, ConsoleSink, ConsoleSinkSt, ConsoleTarget};
#[cfg(feature = "file")]
pub use file::{FileBackend, FileSink, FileSinkSt};
pub use null::{NullBackend, NullSink};
pub use ring_buffer::{RingBufferBackend, RingBufferSink, RingBufferSinkSt};
