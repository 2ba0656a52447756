//! Backtrace example
//!
//! Keeps the last debug records around without printing them, and dumps
//! them once an error shows up.
//!
//! Run with: cargo run --example backtrace

use rust_async_logger::prelude::*;
use rust_async_logger::{debug, error};
use std::sync::Arc;

fn main() -> Result<()> {
    let pool = Arc::new(WorkerPool::builder().threads(1).build()?);
    let console: SinkRef = Arc::new(ConsoleSink::new(ConsoleBackend::stdout()));

    let logger = AsyncLogger::builder("orders", &pool)
        .sink(console)
        .level(LogLevel::Warn)
        .backtrace(8)
        .build();

    for step in 1..=20 {
        debug!(logger, "processing order step {}", step)?;
    }

    error!(logger, "order 42 failed validation")?;
    logger.dump_backtrace()?;
    Ok(())
}
