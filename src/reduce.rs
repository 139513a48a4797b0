//! List-wide operations built as a per-chunk computation plus a merge.
//!
//! Every operation goes through [`Reducer::reduce`]: the input is split into
//! at most `threads` chunks, each chunk is reduced to a partial result on the
//! pool, and the partials are merged in chunk order on the calling thread.
//! `minimum` and `any_match` are the duals of `maximum` and `all_match`.

use crate::error::{Error, Result};
use crate::mapper::BatchMapper;
use crate::partition::partition;
use crate::worker::WorkerPool;
use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::Range;
use std::sync::Arc;

/// Parallel reductions over sequences.
///
/// # Example
///
/// ```
/// use chunkpool::Reducer;
///
/// let reducer = Reducer::new();
/// let text = reducer.concatenate(3, vec!["a", "b", "c", "d", "e"]).unwrap();
/// assert_eq!(text, "abcde");
///
/// let max = reducer.maximum(2, vec![5, 3, 9, 1], |a: &i32, b: &i32| a.cmp(b)).unwrap();
/// assert_eq!(max, 9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Reducer<'p> {
    mapper: BatchMapper<'p>,
}

impl<'p> Reducer<'p> {
    /// A reducer that creates a pool per operation.
    pub fn new() -> Self {
        Reducer {
            mapper: BatchMapper::new(),
        }
    }

    /// A reducer that runs every operation on `pool`.
    pub fn with_pool(pool: &'p WorkerPool) -> Self {
        Reducer {
            mapper: BatchMapper::with_pool(pool),
        }
    }

    /// The generic two-phase reduction.
    ///
    /// `chunk_fn` runs once per chunk on the pool; `merge` receives the
    /// partials in chunk order. An empty input produces no chunks, so
    /// `merge` sees an empty vector.
    pub fn reduce<T, P, O, C, M, I>(&self, threads: usize, items: I, chunk_fn: C, merge: M) -> Result<O>
    where
        T: Send + Sync + 'static,
        P: Send + 'static,
        C: Fn(&[T]) -> P + Send + Sync + 'static,
        M: FnOnce(Vec<P>) -> O,
        I: Into<Arc<[T]>>,
    {
        let items: Arc<[T]> = items.into();
        let chunks = partition(items.len(), threads)?;
        let degree = chunks.len().max(1);

        let partials = self.mapper.apply(
            move |range: &Range<usize>| chunk_fn(&items[range.clone()]),
            chunks,
            degree,
        )?;
        Ok(merge(partials))
    }

    /// Applies `f` to every element, preserving order.
    pub fn transform<T, U, F, I>(&self, threads: usize, items: I, f: F) -> Result<Vec<U>>
    where
        T: Send + Sync + 'static,
        U: Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.reduce(
            threads,
            items,
            move |chunk: &[T]| chunk.iter().map(&f).collect::<Vec<U>>(),
            concat_partials,
        )
    }

    /// Keeps the elements satisfying `predicate`, preserving order.
    pub fn filter<T, F, I>(&self, threads: usize, items: I, predicate: F) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.reduce(
            threads,
            items,
            move |chunk: &[T]| {
                chunk
                    .iter()
                    .filter(|item| predicate(item))
                    .cloned()
                    .collect::<Vec<T>>()
            },
            concat_partials,
        )
    }

    /// Joins the display text of every element.
    pub fn concatenate<T, I>(&self, threads: usize, items: I) -> Result<String>
    where
        T: Display + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.reduce(
            threads,
            items,
            |chunk: &[T]| chunk.iter().map(ToString::to_string).collect::<String>(),
            |partials| partials.concat(),
        )
    }

    /// Largest element under `cmp`; on ties, the earliest one.
    ///
    /// Fails with [`Error::EmptyInput`] when `items` is empty, unless the
    /// pool is already closed.
    pub fn maximum<T, C, I>(&self, threads: usize, items: I, cmp: C) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        if threads == 0 {
            return Err(Error::InvalidConcurrency { requested: 0 });
        }
        if self.mapper.pool().is_some_and(WorkerPool::is_closed) {
            return Err(Error::PoolClosed);
        }
        let items: Arc<[T]> = items.into();
        if items.is_empty() {
            return Err(Error::EmptyInput);
        }

        let cmp = Arc::new(cmp);
        let chunk_cmp = Arc::clone(&cmp);
        self.reduce(
            threads,
            items,
            move |chunk: &[T]| first_max(chunk, &*chunk_cmp).cloned(),
            move |partials| {
                let partials: Vec<T> = partials.into_iter().flatten().collect();
                first_max(&partials[..], &*cmp).cloned().ok_or(Error::EmptyInput)
            },
        )?
    }

    /// Smallest element under `cmp`; on ties, the earliest one.
    pub fn minimum<T, C, I>(&self, threads: usize, items: I, cmp: C) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.maximum(threads, items, move |a: &T, b: &T| cmp(b, a))
    }

    /// True when every element satisfies `predicate` (vacuously true when empty).
    pub fn all_match<T, F, I>(&self, threads: usize, items: I, predicate: F) -> Result<bool>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.reduce(
            threads,
            items,
            move |chunk: &[T]| chunk.iter().all(&predicate),
            |partials| partials.into_iter().all(|ok| ok),
        )
    }

    /// True when some element satisfies `predicate` (false when empty).
    pub fn any_match<T, F, I>(&self, threads: usize, items: I, predicate: F) -> Result<bool>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
        I: Into<Arc<[T]>>,
    {
        self.all_match(threads, items, move |item: &T| !predicate(item))
            .map(|all| !all)
    }
}

fn concat_partials<U>(partials: Vec<Vec<U>>) -> Vec<U> {
    partials.into_iter().flatten().collect()
}

/// Linear-scan maximum that keeps the first of equal elements.
fn first_max<'a, T, C>(items: &'a [T], cmp: &C) -> Option<&'a T>
where
    C: Fn(&T, &T) -> Ordering,
{
    items.iter().fold(None, |best, item| match best {
        Some(current) if cmp(current, item) != Ordering::Less => Some(current),
        _ => Some(item),
    })
}
