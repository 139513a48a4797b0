//! Worker thread implementation.
//!
//! A fixed set of worker threads drains one shared FIFO queue. Each worker
//! blocks while the queue is empty, takes one task, runs it, and repeats
//! until it receives a shutdown sentinel. Closing the pool enqueues one
//! sentinel per worker behind whatever is already queued, so pending tasks
//! still run before the threads exit.

use crate::config::PoolConfig;
use crate::counter::Counter;
use crate::error::{Error, Result};
#[cfg(feature = "metrics")]
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::task::{Message, Task};
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
#[cfg(feature = "metrics")]
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Lifecycle of a pool. The transition is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Running,
    Closed,
}

/// What every worker thread gets a handle to.
#[derive(Clone)]
struct WorkerShared {
    receiver: Receiver<Message>,
    #[cfg(feature = "metrics")]
    metrics: Arc<PoolMetrics>,
}

/// A worker thread that executes tasks from the pool queue.
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Creates and starts a new worker thread.
    fn spawn(id: usize, config: &PoolConfig, shared: WorkerShared) -> std::io::Result<Self> {
        let mut builder = thread::Builder::new().name(format!("{}-{}", config.thread_name, id));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let pin_core = config.pinning.core_for(id);

        let handle = builder.spawn(move || {
            if let Some(core) = pin_core {
                pin_current_thread(id, core);
            }
            Worker::run_loop(id, shared);
        })?;

        Ok(Worker {
            id,
            handle: Some(handle),
        })
    }

    /// Main execution loop for the worker thread.
    fn run_loop(id: usize, shared: WorkerShared) {
        trace!(worker = id, "worker started");

        // recv() suspends while the queue is empty; it only errors once the
        // pool itself is gone.
        while let Ok(message) = shared.receiver.recv() {
            match message {
                Message::Run(task) => {
                    if let Some(reason) = task.execute() {
                        warn!(worker = id, %reason, "task panicked");
                        #[cfg(feature = "metrics")]
                        PoolMetrics::record(&shared.metrics.tasks_panicked, 1);
                    }
                    #[cfg(feature = "metrics")]
                    PoolMetrics::record(&shared.metrics.tasks_completed, 1);
                }
                Message::Shutdown => break,
            }
        }

        trace!(worker = id, "worker exiting");
    }

    /// Returns the worker's ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Waits for the worker thread to finish.
    pub fn join(mut self) -> thread::Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.join()
        } else {
            Ok(())
        }
    }
}

fn pin_current_thread(worker: usize, core: usize) {
    let pinned = core_affinity::get_core_ids()
        .and_then(|ids| ids.get(core).copied())
        .map(core_affinity::set_for_current)
        .unwrap_or(false);
    if !pinned {
        debug!(worker, core, "core not available, running unpinned");
    }
}

/// A fixed-size pool of worker threads sharing one FIFO task queue.
///
/// Dropping the pool closes it without waiting for the workers; use
/// [`WorkerPool::join`] to wait for them.
pub struct WorkerPool {
    workers: Vec<Worker>,
    state: Mutex<PoolState>,
    sender: Sender<Message>,
    #[cfg(feature = "metrics")]
    metrics: Arc<PoolMetrics>,
}

impl WorkerPool {
    /// Creates a pool with `num_threads` workers and default settings otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkpool::WorkerPool;
    ///
    /// let pool = WorkerPool::new(4).expect("spawn workers");
    /// assert_eq!(pool.size(), 4);
    /// pool.close();
    /// ```
    pub fn new(num_threads: usize) -> Result<Self> {
        Self::with_config(PoolConfig::default().with_threads(num_threads))
    }

    /// Creates a pool from an explicit configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        if config.threads == 0 {
            return Err(Error::InvalidConcurrency { requested: 0 });
        }

        let (sender, receiver) = channel::unbounded();
        let shared = WorkerShared {
            receiver,
            #[cfg(feature = "metrics")]
            metrics: Arc::new(PoolMetrics::new()),
        };

        let mut pool = WorkerPool {
            workers: Vec::with_capacity(config.threads),
            state: Mutex::new(PoolState::Running),
            sender,
            #[cfg(feature = "metrics")]
            metrics: Arc::clone(&shared.metrics),
        };

        for id in 0..config.threads {
            // On failure the partially built pool is dropped, which sends a
            // sentinel to each worker started so far.
            let worker = Worker::spawn(id, &config, shared.clone())
                .map_err(|source| Error::WorkerSpawn { source })?;
            pool.workers.push(worker);
        }

        debug!(
            threads = config.threads,
            name = %config.thread_name,
            pinning = ?config.pinning,
            "worker pool started"
        );
        Ok(pool)
    }

    /// Appends a task to the queue and wakes one idle worker.
    ///
    /// Fails with [`Error::PoolClosed`] once [`WorkerPool::close`] has begun.
    pub fn submit(&self, task: Task) -> Result<()> {
        let state = self.lock_state();
        self.ensure_running(&state)?;
        self.sender
            .send(Message::Run(task))
            .map_err(|_| Error::PoolClosed)?;
        #[cfg(feature = "metrics")]
        PoolMetrics::record(&self.metrics.tasks_submitted, 1);
        Ok(())
    }

    /// Submits several tasks under one lock acquisition.
    ///
    /// Either every task is queued or, if the pool is closed, none is.
    pub fn submit_batch(&self, tasks: Vec<Task>) -> Result<()> {
        let state = self.lock_state();
        self.ensure_running(&state)?;
        let count = tasks.len();
        for task in tasks {
            self.sender
                .send(Message::Run(task))
                .map_err(|_| Error::PoolClosed)?;
        }
        #[cfg(feature = "metrics")]
        PoolMetrics::record(&self.metrics.tasks_submitted, count as u64);
        trace!(count, "submitted task batch");
        Ok(())
    }

    /// Submits a closure and returns a counter that completes when it has run.
    pub fn run<F>(&self, work: F) -> Result<Counter>
    where
        F: FnOnce() + Send + 'static,
    {
        let counter = Counter::new(1);
        self.submit(Task::with_counter(work, counter.clone()))?;
        Ok(counter)
    }

    /// Begins shutdown. Idempotent.
    ///
    /// Enqueues one sentinel per worker behind the tasks already queued and
    /// returns without waiting for the workers to exit. Running and queued
    /// tasks are not interrupted.
    pub fn close(&self) {
        let mut state = self.lock_state();
        if *state == PoolState::Closed {
            return;
        }
        *state = PoolState::Closed;

        for _ in 0..self.workers.len() {
            // Can only fail if every worker is already gone.
            let _ = self.sender.send(Message::Shutdown);
        }
        debug!(threads = self.workers.len(), "worker pool closing");
    }

    /// Closes the pool and waits for every worker thread to exit.
    ///
    /// Returns Ok if all workers shut down cleanly, or Err with the
    /// number of workers that panicked.
    pub fn join(mut self) -> std::result::Result<(), usize> {
        self.close();

        let mut failed_count = 0;
        for worker in std::mem::take(&mut self.workers) {
            let worker_id = worker.id();
            if worker.join().is_err() {
                failed_count += 1;
                warn!(worker = worker_id, "worker thread panicked");
            }
        }

        if failed_count > 0 {
            Err(failed_count)
        } else {
            Ok(())
        }
    }

    /// Returns true once [`WorkerPool::close`] has been called.
    pub fn is_closed(&self) -> bool {
        *self.lock_state() == PoolState::Closed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        *self.lock_state()
    }

    /// Returns the number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Returns a snapshot of the pool counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn ensure_running(&self, state: &PoolState) -> Result<()> {
        if *state == PoolState::Closed {
            debug!("rejected submission to closed pool");
            #[cfg(feature = "metrics")]
            PoolMetrics::record(&self.metrics.submissions_rejected, 1);
            return Err(Error::PoolClosed);
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .field("state", &self.state())
            .finish()
    }
}
