//! Worker threads draining the shared async queue
//!
//! Loggers post [`AsyncMessage`]s into the pool's [`BoundedQueue`]; a fixed
//! set of worker threads pop them and run the owning logger's delivery
//! routine. Shutdown is cooperative: dropping the pool posts one
//! `Terminate` per worker and joins them all, so everything queued ahead of
//! the sentinels is delivered first.
//!
//! Records queued by one pool are dequeued in FIFO order, but with more than
//! one worker two records may reach the sinks in either order. Use a single
//! worker when strict delivery order matters.

use super::async_logger::AsyncLogger;
use super::bounded_queue::BoundedQueue;
use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::overflow_policy::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default number of queued messages a pool can hold
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Upper bound on the number of worker threads
pub const MAX_THREADS: usize = 1000;

/// How long an idle worker waits on the queue before checking again
pub const WORKER_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hook run on each worker thread when it starts or stops
pub type ThreadHook = Arc<dyn Fn() + Send + Sync>;

/// Unit of work for the pool
pub enum AsyncMessage {
    Log(Arc<AsyncLogger>, LogRecord),
    Flush(Arc<AsyncLogger>),
    Terminate,
}

impl fmt::Debug for AsyncMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncMessage::Log(logger, record) => f
                .debug_tuple("Log")
                .field(&logger.name())
                .field(&record.payload)
                .finish(),
            AsyncMessage::Flush(logger) => f.debug_tuple("Flush").field(&logger.name()).finish(),
            AsyncMessage::Terminate => f.write_str("Terminate"),
        }
    }
}

/// Serializable pool sizing, e.g. loaded from an application config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    pub queue_capacity: usize,
    pub threads: usize,
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            threads: 1,
            thread_name_prefix: "log-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Parse a config from JSON; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_builder(self) -> WorkerPoolBuilder {
        WorkerPoolBuilder {
            config: self,
            on_thread_start: None,
            on_thread_stop: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 || self.threads > MAX_THREADS {
            return Err(LoggerError::config(
                "WorkerPool",
                format!(
                    "invalid thread count {} (valid range is 1-{})",
                    self.threads, MAX_THREADS
                ),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "WorkerPool",
                "queue capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Fixed set of threads draining one bounded queue of [`AsyncMessage`]s
pub struct WorkerPool {
    queue: Arc<BoundedQueue<AsyncMessage>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `threads` workers over a queue of `queue_capacity` messages
    ///
    /// Fails with [`LoggerError::InvalidConfiguration`] when `threads` is 0 or
    /// above [`MAX_THREADS`], or when `queue_capacity` is 0.
    pub fn new(
        queue_capacity: usize,
        threads: usize,
        on_thread_start: Option<ThreadHook>,
    ) -> Result<Self> {
        let mut builder = Self::builder().queue_capacity(queue_capacity).threads(threads);
        builder.on_thread_start = on_thread_start;
        builder.build()
    }

    #[must_use]
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    fn start(
        config: WorkerPoolConfig,
        on_thread_start: Option<ThreadHook>,
        on_thread_stop: Option<ThreadHook>,
    ) -> Result<Self> {
        config.validate()?;

        // Built incrementally so that a failed spawn still terminates and
        // joins the workers already running, via Drop.
        let mut pool = Self {
            queue: Arc::new(BoundedQueue::new(config.queue_capacity)),
            workers: Vec::with_capacity(config.threads),
        };

        for index in 0..config.threads {
            let queue = Arc::clone(&pool.queue);
            let on_start = on_thread_start.clone();
            let on_stop = on_thread_stop.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, index))
                .spawn(move || {
                    if let Some(hook) = on_start {
                        hook();
                    }
                    tracing::debug!(worker = index, "log worker started");
                    while Self::process_next_message(&queue) {}
                    tracing::debug!(worker = index, "log worker exiting");
                    if let Some(hook) = on_stop {
                        hook();
                    }
                })
                .map_err(|source| LoggerError::ThreadSpawn { source })?;
            pool.workers.push(handle);
        }

        Ok(pool)
    }

    /// Handle one queued message; returns false once the worker should exit
    fn process_next_message(queue: &BoundedQueue<AsyncMessage>) -> bool {
        match queue.dequeue_for(WORKER_WAIT_TIMEOUT) {
            None => true,
            Some(AsyncMessage::Log(logger, record)) => {
                logger.backend_log(&record);
                true
            }
            Some(AsyncMessage::Flush(logger)) => {
                logger.backend_flush();
                true
            }
            Some(AsyncMessage::Terminate) => false,
        }
    }

    pub fn post_log(&self, logger: Arc<AsyncLogger>, record: LogRecord, policy: OverflowPolicy) {
        self.post(AsyncMessage::Log(logger, record), policy);
    }

    pub fn post_flush(&self, logger: Arc<AsyncLogger>, policy: OverflowPolicy) {
        self.post(AsyncMessage::Flush(logger), policy);
    }

    fn post(&self, message: AsyncMessage, policy: OverflowPolicy) {
        match policy {
            OverflowPolicy::Block => self.queue.enqueue(message),
            OverflowPolicy::OverrunOldest => self.queue.enqueue_nowait(message),
            OverflowPolicy::DiscardNew => {
                // Rejected messages are counted by the queue and dropped here
                let _ = self.queue.try_enqueue(message);
            }
        }
    }

    /// Messages overwritten under [`OverflowPolicy::OverrunOldest`]
    pub fn overrun_counter(&self) -> usize {
        self.queue.overrun_counter()
    }

    pub fn reset_overrun_counter(&self) {
        self.queue.reset_overrun_counter();
    }

    /// Messages dropped under [`OverflowPolicy::DiscardNew`]
    pub fn discard_counter(&self) -> usize {
        self.queue.discard_counter()
    }

    pub fn reset_discard_counter(&self) {
        self.queue.reset_discard_counter();
    }

    pub fn queue_size(&self) -> usize {
        self.queue.size()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("queue_size", &self.queue.size())
            .field("queue_capacity", &self.queue.capacity())
            .finish()
    }
}

impl Drop for WorkerPool {
    /// Post one `Terminate` per worker, then join them all
    ///
    /// The sentinels go through the blocking enqueue. If producers keep the
    /// queue saturated under the `Block` policy, a worker may take arbitrarily
    /// long to reach its sentinel; shutdown is not bounded in time.
    ///
    /// When the last handle is dropped on one of the pool's own workers, that
    /// worker may be the only thread able to make room in the queue, so the
    /// shutdown is handed to a detached thread and `drop` returns at once.
    fn drop(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        let current = thread::current().id();
        if !workers.iter().any(|handle| handle.thread().id() == current) {
            Self::shutdown(&self.queue, workers);
            return;
        }

        tracing::debug!(
            threads = workers.len(),
            "log worker pool dropped on its own worker, shutting down in the background"
        );
        let count = workers.len();
        let queue = Arc::clone(&self.queue);
        let spawned = thread::Builder::new()
            .name("log-worker-shutdown".to_string())
            .spawn(move || Self::shutdown(&queue, workers));
        if let Err(err) = spawned {
            // Workers are left detached; sentinels may overwrite queued records
            tracing::warn!(error = %err, "could not spawn log pool shutdown thread");
            for _ in 0..count {
                self.queue.enqueue_nowait(AsyncMessage::Terminate);
            }
        }
    }
}

impl WorkerPool {
    fn shutdown(queue: &BoundedQueue<AsyncMessage>, workers: Vec<JoinHandle<()>>) {
        tracing::debug!(threads = workers.len(), "shutting down log worker pool");
        for _ in 0..workers.len() {
            queue.enqueue(AsyncMessage::Terminate);
        }
        tracing::trace!(queued = queue.size(), "terminate sentinels posted");

        for handle in workers {
            if handle.join().is_err() {
                tracing::warn!("log worker thread panicked before shutdown");
            }
        }
    }
}

/// Builder for [`WorkerPool`]
///
/// # Example
///
/// ```
/// use rust_async_logger::WorkerPool;
/// use std::sync::Arc;
///
/// let pool = WorkerPool::builder()
///     .queue_capacity(1024)
///     .threads(2)
///     .on_thread_start(Arc::new(|| {}))
///     .build()
///     .unwrap();
/// assert_eq!(pool.threads(), 2);
/// ```
pub struct WorkerPoolBuilder {
    config: WorkerPoolConfig,
    on_thread_start: Option<ThreadHook>,
    on_thread_stop: Option<ThreadHook>,
}

impl WorkerPoolBuilder {
    pub fn new() -> Self {
        WorkerPoolConfig::default().into_builder()
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Prefix of worker thread names; workers are named `<prefix>-<index>`
    #[must_use = "builder methods return a new value"]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_thread_start(mut self, hook: ThreadHook) -> Self {
        self.on_thread_start = Some(hook);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_thread_stop(mut self, hook: ThreadHook) -> Self {
        self.on_thread_stop = Some(hook);
        self
    }

    pub fn build(self) -> Result<WorkerPool> {
        WorkerPool::start(self.config, self.on_thread_start, self.on_thread_stop)
    }
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
