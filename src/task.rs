//! Task definitions and execution logic.
//!
//! Tasks are units of work executed by the worker pool. They encapsulate a
//! closure and an optional counter for tracking completion.

use crate::counter::Counter;
use std::panic::{self, AssertUnwindSafe};

/// A unit of work to be executed by the worker pool.
///
/// Tasks consist of a closure to execute and an optional counter
/// that is decremented upon completion.
pub struct Task {
    /// The work to be executed
    work: Box<dyn FnOnce() + Send + 'static>,
    /// Optional counter to decrement when the task completes
    counter: Option<Counter>,
}

impl Task {
    /// Creates a new task with the given work function.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            work: Box::new(work),
            counter: None,
        }
    }

    /// Creates a new task with an associated counter.
    pub fn with_counter<F>(work: F, counter: Counter) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            work: Box::new(work),
            counter: Some(counter),
        }
    }

    /// Executes the task and decrements its counter if present.
    ///
    /// A panic inside the closure is contained here so the worker thread
    /// survives it; the counter is still decremented. Returns the panic
    /// message if the closure panicked.
    pub fn execute(self) -> Option<String> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(self.work));

        if let Some(counter) = self.counter {
            counter.decrement();
        }

        outcome
            .err()
            .map(|payload| crate::error::panic_message(payload.as_ref()))
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

/// An entry in the pool's queue.
pub(crate) enum Message {
    /// Work to execute.
    Run(Task),
    /// Sentinel: the worker that receives it exits.
    Shutdown,
}
