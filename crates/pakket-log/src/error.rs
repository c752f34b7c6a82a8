//! Error types for pakket-log.

/// Errors produced by the relay's worker-process handling.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The worker process could not be spawned.
    #[error("cannot start worker process: {source}")]
    Spawn { source: std::io::Error },

    /// The worker process was spawned without a captured output stream.
    #[error("worker process has no captured standard output")]
    NoWorkerOutput,

    /// Waiting on the worker process failed.
    #[error("cannot wait for worker process: {source}")]
    Wait { source: std::io::Error },
}
