//! Async logging example
//!
//! Demonstrates a shared worker pool, several producer threads and the
//! overflow policies.
//!
//! Run with: cargo run --example async_logging

use rust_async_logger::prelude::*;
use rust_async_logger::{info, warn};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Async Logger - Async Logging Example ===\n");

    let pool = Arc::new(
        WorkerPool::builder()
            .queue_capacity(1024)
            .threads(2)
            .build()?,
    );

    let console: SinkRef = Arc::new(ConsoleSink::new(ConsoleBackend::new()));
    console.set_pattern("[%H:%M:%S.%e] [%n] [%l] [%t] %v");
    let logger = AsyncLogger::builder("main", &pool).sink(Arc::clone(&console)).build();

    println!("1. High-performance async logging:");
    for i in 0..100 {
        info!(logger, "Message #{}", i)?;
    }
    println!("   Logged 100 messages asynchronously");

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = logger.clone_with_name(format!("worker-{}", thread_id));
            thread::spawn(move || -> Result<()> {
                for i in 0..20 {
                    info!(logger, "Thread {} - Message {}", thread_id, i)?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .map_err(|_| LoggerError::other("producer thread panicked"))??;
    }
    println!("   5 threads logged 20 messages each");

    println!("\n3. Lossy overflow policy:");
    let lossy = AsyncLogger::builder("lossy", &pool)
        .sink(console)
        .overflow_policy(OverflowPolicy::DiscardNew)
        .build();
    for i in 0..5000 {
        lossy.info(format!("burst {}", i))?;
    }
    warn!(lossy, "discarded so far: {}", pool.discard_counter())?;

    logger.flush()?;

    // Dropping the pool drains the queue and joins the workers
    drop(pool);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
