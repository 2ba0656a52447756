//! File logging example
//!
//! Demonstrates logging to console and file sinks at once, with a separate
//! level per sink and flushing on errors.
//!
//! Run with: cargo run --example file_logging

use rust_async_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Async Logger - File Logging Example ===\n");

    let pool = Arc::new(WorkerPool::builder().threads(1).build()?);

    let file: SinkRef = Arc::new(FileSink::new(FileBackend::new("application.log")?));
    file.set_level(LogLevel::Debug);

    let json: SinkRef = Arc::new(FileSink::with_formatter(
        FileBackend::truncate("application.jsonl")?,
        Box::new(JsonFormatter::new().with_location(true)),
    ));

    let builder = AsyncLogger::builder("app", &pool)
        .sinks([file, json])
        .level(LogLevel::Debug)
        .flush_level(LogLevel::Error);
    #[cfg(feature = "console")]
    let builder = builder.sink(Arc::new(
        ConsoleSink::new(ConsoleBackend::new()).with_level(LogLevel::Info),
    ));
    let logger = builder.build();

    println!("1. Logging to console and file:");
    logger.info("Application started")?;
    logger.debug("Loading configuration...")?;
    logger.info("Configuration loaded successfully")?;
    logger.warn("Using default settings for some options")?;
    logger.error("Failed to load optional plugin")?;

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i))?;
        if i == 3 {
            logger.warn("Item 3 took longer than expected")?;
        }
    }
    logger.info("All operations completed")?;
    logger.flush()?;

    drop(pool);

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' and 'application.jsonl' for the full log output");
    Ok(())
}
