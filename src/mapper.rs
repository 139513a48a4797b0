//! Parallel, order-preserving map over a sequence.
//!
//! The sequence is partitioned into contiguous chunks, one task per chunk is
//! queued on a worker pool, and the caller blocks until every chunk has
//! reported back. Each chunk writes into its own index range of a result
//! buffer, so the output order is the input order no matter which worker
//! finishes first.

use crate::counter::Counter;
use crate::error::{Error, Result, panic_message};
use crate::partition::partition;
use crate::task::Task;
use crate::worker::WorkerPool;
use std::convert::Infallible;
use std::fmt::Display;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Output slots for one batch plus the first failure seen.
struct ResultBuffer<R> {
    slots: Vec<Option<R>>,
    failure: Option<Error>,
}

impl<R> ResultBuffer<R> {
    fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        ResultBuffer {
            slots,
            failure: None,
        }
    }

    fn write(&mut self, start: usize, values: Vec<R>) {
        for (slot, value) in self.slots[start..].iter_mut().zip(values) {
            *slot = Some(value);
        }
    }

    fn fail(&mut self, chunk: usize, reason: String) {
        // First failure wins.
        if self.failure.is_none() {
            self.failure = Some(Error::ChunkTaskFailed { chunk, reason });
        }
    }
}

impl<R> Default for ResultBuffer<R> {
    fn default() -> Self {
        ResultBuffer {
            slots: Vec::new(),
            failure: None,
        }
    }
}

fn lock<R>(buffer: &Mutex<ResultBuffer<R>>) -> MutexGuard<'_, ResultBuffer<R>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Maps a function over a sequence in parallel.
///
/// Without a pool, a pool sized to the partition degree is created for this
/// call and closed before it returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchMapper<'p> {
    pool: Option<&'p WorkerPool>,
}

impl<'p> BatchMapper<'p> {
    /// A mapper that creates a pool per call.
    pub fn new() -> Self {
        BatchMapper { pool: None }
    }

    /// A mapper that submits to an existing pool.
    pub fn with_pool(pool: &'p WorkerPool) -> Self {
        BatchMapper { pool: Some(pool) }
    }

    /// The shared pool, if any.
    pub fn pool(&self) -> Option<&'p WorkerPool> {
        self.pool
    }

    /// Applies `f` to every element using at most `max_concurrency` chunks.
    ///
    /// The result has the same length and order as `items`. A panic inside
    /// `f` fails the whole batch with [`Error::ChunkTaskFailed`].
    ///
    /// # Example
    ///
    /// ```
    /// use chunkpool::BatchMapper;
    ///
    /// let squares = BatchMapper::new()
    ///     .apply(|x: &u64| x * x, vec![1, 2, 3, 4, 5], 2)
    ///     .unwrap();
    /// assert_eq!(squares, vec![1, 4, 9, 16, 25]);
    /// ```
    pub fn apply<T, R, F, I>(&self, f: F, items: I, max_concurrency: usize) -> Result<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.try_apply(move |item| Ok::<R, Infallible>(f(item)), items, max_concurrency)
    }

    /// Like [`BatchMapper::apply`] for a fallible function.
    ///
    /// The first `Err` (or panic) recorded by any chunk becomes
    /// [`Error::ChunkTaskFailed`] carrying the error's display text. Chunks
    /// that start after a failure has been recorded skip their work.
    pub fn try_apply<T, R, E, F, I>(
        &self,
        f: F,
        items: I,
        max_concurrency: usize,
    ) -> Result<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        E: Display + 'static,
        F: Fn(&T) -> std::result::Result<R, E> + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        if max_concurrency == 0 {
            return Err(Error::InvalidConcurrency { requested: 0 });
        }
        if self.pool.is_some_and(WorkerPool::is_closed) {
            return Err(Error::PoolClosed);
        }

        let items: Arc<[T]> = items.into();
        let chunks = partition(items.len(), max_concurrency)?;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        // A call-scoped pool is dropped, and therefore closed, on every
        // return path below.
        let scoped;
        let pool = match self.pool {
            Some(pool) => pool,
            None => {
                scoped = WorkerPool::new(chunks.len())?;
                &scoped
            }
        };

        dispatch(pool, f, items, chunks)
    }
}

/// Free-function form of [`BatchMapper::apply`].
pub fn apply<T, R, F, I>(
    f: F,
    items: I,
    max_concurrency: usize,
    pool: Option<&WorkerPool>,
) -> Result<Vec<R>>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
    I: Into<Arc<[T]>>,
{
    BatchMapper { pool }.apply(f, items, max_concurrency)
}

fn dispatch<T, R, E, F>(
    pool: &WorkerPool,
    f: F,
    items: Arc<[T]>,
    chunks: Vec<Range<usize>>,
) -> Result<Vec<R>>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    E: Display + 'static,
    F: Fn(&T) -> std::result::Result<R, E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let buffer = Arc::new(Mutex::new(ResultBuffer::new(items.len())));
    let counter = Counter::new(chunks.len());

    trace!(chunks = chunks.len(), len = items.len(), "dispatching batch");

    for (chunk, range) in chunks.iter().cloned().enumerate() {
        let f = Arc::clone(&f);
        let items = Arc::clone(&items);
        let buffer = Arc::clone(&buffer);
        let work = move || run_chunk(chunk, range, &items[..], &*f, &*buffer);
        // Tasks already queued keep their own handles to the data, so
        // bailing out here leaves nothing dangling.
        pool.submit(Task::with_counter(work, counter.clone()))?;
    }

    counter.wait();

    let ResultBuffer { slots, failure } = std::mem::take(&mut *lock(&*buffer));
    if let Some(err) = failure {
        debug!(error = %err, "batch failed");
        return Err(err);
    }

    if let Some(missing) = slots.iter().position(Option::is_none) {
        let chunk = chunks
            .iter()
            .position(|range| range.contains(&missing))
            .unwrap_or_default();
        return Err(Error::ChunkTaskFailed {
            chunk,
            reason: "chunk finished without writing its results".to_string(),
        });
    }

    Ok(slots.into_iter().flatten().collect())
}

fn run_chunk<T, R, E, F>(
    chunk: usize,
    range: Range<usize>,
    items: &[T],
    f: &F,
    buffer: &Mutex<ResultBuffer<R>>,
) where
    E: Display,
    F: Fn(&T) -> std::result::Result<R, E>,
{
    if lock(buffer).failure.is_some() {
        return;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        items[range.clone()]
            .iter()
            .map(f)
            .collect::<std::result::Result<Vec<R>, E>>()
    }));

    let mut buffer = lock(buffer);
    match outcome {
        Ok(Ok(values)) => buffer.write(range.start, values),
        Ok(Err(err)) => buffer.fail(chunk, err.to_string()),
        Err(payload) => buffer.fail(chunk, panic_message(payload.as_ref())),
    }
}
