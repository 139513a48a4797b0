#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "metrics")]
use std::time::Instant;

/// Optional counters for a worker pool.
#[cfg(feature = "metrics")]
#[derive(Debug)]
pub struct PoolMetrics {
    /// Tasks accepted into the queue.
    pub tasks_submitted: AtomicU64,
    /// Tasks that ran to completion (including those that panicked).
    pub tasks_completed: AtomicU64,
    /// Tasks whose closure panicked.
    pub tasks_panicked: AtomicU64,
    /// Submissions refused because the pool was closed.
    pub submissions_rejected: AtomicU64,
    /// Time when metrics collection started.
    pub start_time: Instant,
}

#[cfg(feature = "metrics")]
impl PoolMetrics {
    /// Creates a new metrics instance.
    pub fn new() -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            submissions_rejected: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn record(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Returns a snapshot of current metrics values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(feature = "metrics")]
impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub tasks_submitted: u64,
    pub tasks_completed: u64,
    pub tasks_panicked: u64,
    pub submissions_rejected: u64,
    pub elapsed_seconds: f64,
}

#[cfg(feature = "metrics")]
impl MetricsSnapshot {
    /// Calculates tasks per second throughput.
    pub fn tasks_per_second(&self) -> f64 {
        if self.elapsed_seconds > 0.0 {
            self.tasks_completed as f64 / self.elapsed_seconds
        } else {
            0.0
        }
    }

    /// Approximates queue depth (accepted but not yet finished).
    pub fn queue_depth(&self) -> i64 {
        self.tasks_submitted as i64 - self.tasks_completed as i64
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = PoolMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_submitted, 0);
        assert_eq!(snapshot.tasks_completed, 0);
        assert_eq!(snapshot.tasks_panicked, 0);
        assert_eq!(snapshot.submissions_rejected, 0);
        assert!(snapshot.elapsed_seconds >= 0.0);
    }

    #[test]
    fn test_metrics_updates() {
        let metrics = PoolMetrics::new();

        PoolMetrics::record(&metrics.tasks_submitted, 10);
        PoolMetrics::record(&metrics.tasks_completed, 8);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_submitted, 10);
        assert_eq!(snapshot.tasks_completed, 8);
        assert_eq!(snapshot.queue_depth(), 2);
    }

    #[test]
    fn test_throughput_calculation() {
        let metrics = PoolMetrics::new();
        PoolMetrics::record(&metrics.tasks_completed, 100);

        thread::sleep(Duration::from_millis(10));
        let snapshot = metrics.snapshot();

        assert!(snapshot.tasks_per_second() > 0.0);
    }
}
