//! End-to-end tests: loggers, worker pool and sinks together

use crossbeam_channel::{unbounded, Receiver, Sender};
use rust_async_logger::prelude::*;
use rust_async_logger::sinks::RingBufferSinkSt;
use rust_async_logger::{critical, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn pool(threads: usize) -> Arc<WorkerPool> {
    Arc::new(
        WorkerPool::builder()
            .queue_capacity(256)
            .threads(threads)
            .build()
            .expect("Failed to start worker pool"),
    )
}

fn ring_sink(capacity: usize, pattern: &str) -> Arc<RingBufferSink> {
    let sink = Arc::new(RingBufferSink::new(RingBufferBackend::new(capacity)));
    sink.set_pattern(pattern);
    sink
}

fn lines(sink: &RingBufferSink) -> Vec<String> {
    sink.with_backend(|backend| backend.last_formatted(0))
}

/// Sends each payload over a channel as soon as it is written
struct ChannelBackend(Sender<String>);

impl SinkBackend for ChannelBackend {
    fn write(&mut self, record: &LogRecord, _formatted: &[u8]) -> Result<()> {
        let _ = self.0.send(record.payload.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn channel_sink() -> (SinkRef, Receiver<String>) {
    let (tx, rx) = unbounded();
    let sink: SinkRef = Arc::new(SerializedSink::<_>::new(ChannelBackend(tx)));
    (sink, rx)
}

#[test]
fn test_file_sink_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let pool = pool(1);
    let sink = Arc::new(FileSink::new(
        FileBackend::new(&log_file).expect("Failed to open log file"),
    ));
    sink.set_pattern("[%n] [%l] %v");
    let logger = AsyncLogger::builder("app", &pool)
        .sink(sink)
        .level(LogLevel::Debug)
        .build();

    for i in 0..100 {
        logger.debug(format!("message {}", i)).unwrap();
    }
    logger.warn("last one").unwrap();
    logger.flush().unwrap();
    drop(pool);

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 101);
    assert_eq!(lines[0], "[app] [DEBUG] message 0");
    assert_eq!(lines[99], "[app] [DEBUG] message 99");
    assert_eq!(lines[100], "[app] [WARN] last one");
}

#[test]
fn test_everything_posted_before_drop_is_delivered() {
    let pool = pool(1);
    let sink = ring_sink(1000, "%v");
    let logger = AsyncLogger::builder("drain", &pool)
        .sink(Arc::clone(&sink) as SinkRef)
        .build();

    for i in 0..500 {
        logger.info(format!("{}", i)).unwrap();
    }
    drop(pool);

    let expected: Vec<String> = (0..500).map(|i| format!("{}\n", i)).collect();
    assert_eq!(lines(&sink), expected);
}

#[test]
fn test_loggers_share_a_sink() {
    let pool = pool(1);
    let sink = ring_sink(16, "%n: %v");
    let api = AsyncLogger::builder("api", &pool)
        .sink(Arc::clone(&sink) as SinkRef)
        .build();
    let db = api.clone_with_name("db");

    api.info("request").unwrap();
    db.info("query").unwrap();
    api.info("response").unwrap();
    drop(pool);

    assert_eq!(lines(&sink), vec!["api: request\n", "db: query\n", "api: response\n"]);
}

#[test]
fn test_logger_dropped_with_records_in_flight() {
    let pool = pool(2);
    let (sink, rx) = channel_sink();
    {
        let logger = AsyncLogger::new("short-lived", vec![sink], &pool, OverflowPolicy::Block);
        for i in 0..50 {
            logger.info(format!("{}", i)).unwrap();
        }
        // Queued messages keep the logger alive after this scope
    }

    let mut received: Vec<usize> = (0..50)
        .map(|_| rx.recv_timeout(WAIT).unwrap().parse().unwrap())
        .collect();
    received.sort_unstable();
    assert_eq!(received, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_json_formatter_per_sink() {
    let pool = pool(1);
    let json = ring_sink(4, "%v");
    let text = ring_sink(4, "%l %v");
    let logger = AsyncLogger::new(
        "svc",
        vec![Arc::clone(&json) as SinkRef, Arc::clone(&text) as SinkRef],
        &pool,
        OverflowPolicy::Block,
    );

    json.set_formatter(Box::new(JsonFormatter::new().with_location(true)));
    critical!(logger, "disk {} full", "/var").unwrap();
    drop(pool);

    let json_lines = lines(&json);
    let parsed: serde_json::Value = serde_json::from_str(json_lines[0].trim_end()).unwrap();
    assert_eq!(parsed["logger"], "svc");
    assert_eq!(parsed["level"], "CRITICAL");
    assert_eq!(parsed["message"], "disk /var full");
    assert_eq!(parsed["file"], "tests/integration_tests.rs");

    assert_eq!(lines(&text), vec!["CRITICAL disk /var full\n"]);
}

#[test]
fn test_logger_wide_formatter_is_copied_per_sink() {
    let pool = pool(1);
    let a = ring_sink(4, "%v");
    let b = ring_sink(4, "%v");
    let logger = AsyncLogger::new(
        "svc",
        vec![Arc::clone(&a) as SinkRef, Arc::clone(&b) as SinkRef],
        &pool,
        OverflowPolicy::Block,
    );

    logger.set_formatter(Box::new(PatternFormatter::new("<%n> %v")));
    a.set_pattern("only a: %v");
    logger.info("hello").unwrap();
    drop(pool);

    assert_eq!(lines(&a), vec!["only a: hello\n"]);
    assert_eq!(lines(&b), vec!["<svc> hello\n"]);
}

#[test]
fn test_backtrace_dump_through_macros() {
    let pool = pool(1);
    let sink = ring_sink(16, "%l %v");
    let logger = AsyncLogger::builder("bt", &pool)
        .sink(Arc::clone(&sink) as SinkRef)
        .level(LogLevel::Error)
        .backtrace(2)
        .build();

    logger.debug("step 1").unwrap();
    logger.trace("step 2").unwrap();
    info!(logger, "step {}", 3).unwrap();
    logger.error("failed").unwrap();
    logger.dump_backtrace().unwrap();
    drop(pool);

    assert_eq!(
        lines(&sink),
        vec![
            "ERROR failed\n",
            "INFO ****************** Backtrace Start ******************\n",
            // "failed" was retained too, after "step 3"
            "INFO step 3\n",
            "ERROR failed\n",
            "INFO ****************** Backtrace End ********************\n",
        ]
    );
}

#[test]
fn test_error_handler_receives_sink_errors() {
    struct Broken;
    impl SinkBackend for Broken {
        fn write(&mut self, _record: &LogRecord, _formatted: &[u8]) -> Result<()> {
            Err(LoggerError::sink("broken", "device unplugged"))
        }
        fn flush(&mut self) -> Result<()> {
            Err(LoggerError::sink("broken", "flush failed"))
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    let pool = pool(1);
    let errors = Arc::new(AtomicUsize::new(0));
    let (err_tx, err_rx) = unbounded();
    let logger = {
        let errors = Arc::clone(&errors);
        AsyncLogger::builder("fragile", &pool)
            .sink(Arc::new(SerializedSink::<_>::new(Broken)))
            .error_handler(Arc::new(move |name: &str, err: &LoggerError| {
                errors.fetch_add(1, Ordering::SeqCst);
                let _ = err_tx.send(format!("{} {}", name, err));
            }))
            .build()
    };

    logger.info("lost").unwrap();
    logger.flush().unwrap();

    assert_eq!(
        err_rx.recv_timeout(WAIT).unwrap(),
        "fragile Sink error (broken): device unplugged"
    );
    assert_eq!(
        err_rx.recv_timeout(WAIT).unwrap(),
        "fragile Sink error (broken): flush failed"
    );
    drop(pool);
    assert_eq!(errors.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pool_from_config() {
    let config = WorkerPoolConfig::from_json(
        r#"{"queue_capacity": 128, "threads": 3, "thread_name_prefix": "io"}"#,
    )
    .unwrap();
    let pool = Arc::new(config.into_builder().build().unwrap());
    assert_eq!(pool.threads(), 3);
    assert_eq!(pool.queue_capacity(), 128);

    let sink = ring_sink(2000, "%v");
    let logger = AsyncLogger::new("cfg", vec![Arc::clone(&sink) as SinkRef], &pool, OverflowPolicy::Block);
    for i in 0..1000 {
        logger.info(format!("{}", i)).unwrap();
    }
    drop(pool);

    let mut delivered: Vec<usize> = lines(&sink)
        .iter()
        .map(|l| l.trim_end().parse().unwrap())
        .collect();
    delivered.sort_unstable();
    assert_eq!(delivered, (0..1000).collect::<Vec<_>>());
}

#[test]
fn test_invalid_pool_config_is_rejected() {
    let config = WorkerPoolConfig::from_json(r#"{"threads": 0}"#).unwrap();
    let err = config.into_builder().build().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("thread count"));
}

#[test]
fn test_level_and_policy_from_strings() {
    let pool = pool(1);
    let logger = AsyncLogger::builder("parsed", &pool)
        .level("warning".parse().unwrap())
        .overflow_policy("overrun-oldest".parse().unwrap())
        .build();
    assert_eq!(logger.level(), LogLevel::Warn);
    assert_eq!(logger.overflow_policy(), OverflowPolicy::OverrunOldest);
}

#[test]
fn test_single_threaded_sink_outside_the_pool() {
    // Sinks without locking can still be driven directly from one thread
    let sink = RingBufferSinkSt::new(RingBufferBackend::new(2));
    sink.set_pattern("%v");
    sink.log(&LogRecord::new(Arc::from("local"), LogLevel::Info, "direct"))
        .unwrap();
    sink.with_backend(|backend| assert_eq!(backend.last_formatted(0), vec!["direct\n"]));
}
