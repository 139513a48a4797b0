//! Counter-based synchronization for tracking task completion.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

struct InnerCounter {
    value: Mutex<usize>,
    zero: Condvar,
}

/// A thread-safe countdown of outstanding tasks.
///
/// A counter starts at the number of tasks a caller is waiting on. Every
/// finished task decrements it once; [`Counter::wait`] releases when the
/// value reaches zero. Clones share the same underlying value.
#[derive(Clone)]
pub struct Counter {
    inner: Arc<InnerCounter>,
}

impl Counter {
    /// Creates a new counter with the specified initial value.
    pub fn new(initial: usize) -> Self {
        Counter {
            inner: Arc::new(InnerCounter {
                value: Mutex::new(initial),
                zero: Condvar::new(),
            }),
        }
    }

    /// Decrements the counter by one and wakes waiters if it reached zero.
    ///
    /// Returns true if the counter reached zero. Decrementing a counter that
    /// is already zero is a no-op.
    pub fn decrement(&self) -> bool {
        let mut value = self.lock();
        if *value == 0 {
            return true;
        }
        *value -= 1;
        if *value == 0 {
            self.inner.zero.notify_all();
            true
        } else {
            false
        }
    }

    /// Blocks the calling thread until the counter reaches zero.
    pub fn wait(&self) {
        let mut value = self.lock();
        while *value > 0 {
            value = self
                .inner
                .zero
                .wait(value)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns the current value of the counter.
    pub fn value(&self) -> usize {
        *self.lock()
    }

    /// Checks if the counter has reached zero.
    pub fn is_complete(&self) -> bool {
        self.value() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.inner.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter").field("value", &self.value()).finish()
    }
}
