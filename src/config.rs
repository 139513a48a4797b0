//! Worker pool configuration.

use serde::{Deserialize, Serialize};
use std::thread;

/// Strategy for pinning worker threads to CPU cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PinningStrategy {
    /// No pinning (standard OS scheduling).
    #[default]
    None,
    /// Linear pinning (worker i -> logical processor i).
    Linear,
    /// Pin to physical cores only (even-numbered logical processors), avoiding SMT contention.
    AvoidSmt,
}

impl PinningStrategy {
    /// Logical core index for the given worker, if this strategy pins at all.
    pub fn core_for(self, worker_id: usize) -> Option<usize> {
        match self {
            PinningStrategy::None => None,
            PinningStrategy::Linear => Some(worker_id),
            PinningStrategy::AvoidSmt => Some(worker_id * 2),
        }
    }
}

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads. Default: available parallelism.
    pub threads: usize,
    /// Prefix for worker thread names; the worker id is appended.
    pub thread_name: String,
    /// Stack size for each worker thread in bytes. Default: platform default.
    pub stack_size: Option<usize>,
    /// CPU pinning for worker threads.
    pub pinning: PinningStrategy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            thread_name: "chunkpool-worker".to_string(),
            stack_size: None,
            pinning: PinningStrategy::None,
        }
    }
}

impl PoolConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn with_pinning(mut self, pinning: PinningStrategy) -> Self {
        self.pinning = pinning;
        self
    }
}

/// One thread per logical CPU, falling back to 4 when that cannot be queried.
pub fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
