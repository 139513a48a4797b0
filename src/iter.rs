//! Slice extension for running the reductions with iterator-style calls.

use crate::error::Result;
use crate::reduce::Reducer;
use crate::worker::WorkerPool;
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::Arc;

/// Extension trait giving slices access to the parallel reductions.
///
/// ```
/// use chunkpool::ParallelSlice;
///
/// let evens = [1, 2, 3, 4, 5, 6].par(4).filter(|x| x % 2 == 0).unwrap();
/// assert_eq!(evens, vec![2, 4, 6]);
/// ```
pub trait ParallelSlice<T> {
    /// Runs on call-scoped pools with at most `threads` chunks.
    fn par(&self, threads: usize) -> ParallelIter<'static, T>;

    /// Runs on `pool` with at most `threads` chunks.
    fn par_in<'p>(&self, threads: usize, pool: &'p WorkerPool) -> ParallelIter<'p, T>;
}

impl<T: Clone + Send + Sync + 'static> ParallelSlice<T> for [T] {
    fn par(&self, threads: usize) -> ParallelIter<'static, T> {
        ParallelIter {
            items: Arc::from(self),
            threads,
            reducer: Reducer::new(),
        }
    }

    fn par_in<'p>(&self, threads: usize, pool: &'p WorkerPool) -> ParallelIter<'p, T> {
        ParallelIter {
            items: Arc::from(self),
            threads,
            reducer: Reducer::with_pool(pool),
        }
    }
}

/// A slice snapshot bound to a chunk count and a pool choice.
///
/// Each consuming method runs one reduction and returns its result.
pub struct ParallelIter<'p, T> {
    items: Arc<[T]>,
    threads: usize,
    reducer: Reducer<'p>,
}

impl<'p, T: Clone + Send + Sync + 'static> ParallelIter<'p, T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applies `f` to every element, preserving order.
    pub fn map<U, F>(self, f: F) -> Result<Vec<U>>
    where
        U: Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.reducer.transform(self.threads, self.items, f)
    }

    /// Keeps the elements satisfying `predicate`.
    pub fn filter<F>(self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.reducer.filter(self.threads, self.items, predicate)
    }

    /// Largest element under `cmp`, earliest on ties.
    pub fn max_by<C>(self, cmp: C) -> Result<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.reducer.maximum(self.threads, self.items, cmp)
    }

    /// Smallest element under `cmp`, earliest on ties.
    pub fn min_by<C>(self, cmp: C) -> Result<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.reducer.minimum(self.threads, self.items, cmp)
    }

    /// True when every element satisfies `predicate`.
    pub fn all<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.reducer.all_match(self.threads, self.items, predicate)
    }

    /// True when some element satisfies `predicate`.
    pub fn any<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.reducer.any_match(self.threads, self.items, predicate)
    }
}

impl<'p, T: Ord + Clone + Send + Sync + 'static> ParallelIter<'p, T> {
    /// Largest element in natural order.
    pub fn max(self) -> Result<T> {
        self.max_by(T::cmp)
    }

    /// Smallest element in natural order.
    pub fn min(self) -> Result<T> {
        self.min_by(T::cmp)
    }
}

impl<'p, T: Display + Clone + Send + Sync + 'static> ParallelIter<'p, T> {
    /// Joins the display text of every element.
    pub fn concat(self) -> Result<String> {
        self.reducer.concatenate(self.threads, self.items)
    }
}
