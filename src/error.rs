//! Error types shared by the pool, the batch mapper and the reductions.

use std::any::Any;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while scheduling or running a batch.
#[derive(Error, Debug)]
pub enum Error {
    /// A submission arrived after the pool started shutting down.
    #[error("worker pool is closed")]
    PoolClosed,

    /// Zero threads or zero chunks were requested.
    #[error("invalid concurrency: {requested} (must be at least 1)")]
    InvalidConcurrency { requested: usize },

    /// `maximum`/`minimum` over a sequence with no elements.
    #[error("operation requires at least one element")]
    EmptyInput,

    /// A per-chunk computation panicked or returned an error.
    #[error("chunk {chunk} failed: {reason}")]
    ChunkTaskFailed { chunk: usize, reason: String },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::PoolClosed.to_string(), "worker pool is closed");
        assert_eq!(
            Error::InvalidConcurrency { requested: 0 }.to_string(),
            "invalid concurrency: 0 (must be at least 1)"
        );
        let err = Error::ChunkTaskFailed {
            chunk: 2,
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "chunk 2 failed: boom");
        assert_eq!(Error::EmptyInput.to_string(), "operation requires at least one element");
    }

    #[test]
    fn test_panic_message_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(static_str.as_ref()), "static");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(other.as_ref()), "task panicked");
    }
}
