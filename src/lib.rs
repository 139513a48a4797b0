//! # chunkpool - Chunked Parallel Map and Reduce on a Fixed Worker Pool
//!
//! A small parallel task-execution core: a fixed-size pool of worker threads
//! draining one shared FIFO queue, and a batch layer on top that splits a
//! sequence into contiguous chunks, runs one task per chunk, and stitches the
//! partial results back together in the original order.
//!
//! ## Architecture
//!
//! - **Partitioner**: splits `0..len` into at most N gap-free chunks; the last
//!   chunk absorbs the remainder
//! - **WorkerPool**: fixed worker threads, a shared queue, and a one-way
//!   shutdown that enqueues one sentinel per worker
//! - **BatchMapper**: per-element map over a sequence, one task per chunk,
//!   blocking until every chunk reports back
//! - **Reducer**: map, filter, concatenate, min/max and all/any expressed as a
//!   per-chunk computation plus a merge
//!
//! ## Example
//!
//! ```
//! use chunkpool::{Reducer, WorkerPool};
//!
//! let pool = WorkerPool::new(4).unwrap();
//! let reducer = Reducer::with_pool(&pool);
//!
//! let evens = reducer.filter(4, vec![1, 2, 3, 4, 5, 6], |x: &i32| x % 2 == 0).unwrap();
//! assert_eq!(evens, vec![2, 4, 6]);
//!
//! pool.close();
//! ```

pub mod config;
pub mod counter;
pub mod error;
pub mod iter;
pub mod mapper;
pub mod metrics;
pub mod partition;
pub mod reduce;
pub mod task;
pub mod worker;

pub use config::{PinningStrategy, PoolConfig};
pub use counter::Counter;
pub use error::{Error, Result};
pub use iter::{ParallelIter, ParallelSlice};
pub use mapper::{BatchMapper, apply};
pub use partition::partition;
pub use reduce::Reducer;
pub use task::Task;
pub use worker::{PoolState, WorkerPool};

#[cfg(feature = "metrics")]
pub use metrics::{MetricsSnapshot, PoolMetrics};
