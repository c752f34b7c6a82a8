#![forbid(unsafe_code)]
//! Cross-process diagnostic relay: an ordered single-consumer logging
//! queue, the structured line-oriented message format, the console-side
//! queue that serializes messages to stdout, and the host-side relay that
//! reconstructs them in the parent process.

pub mod console;
pub mod error;
pub mod events;
pub mod message;
pub mod queue;
pub mod relay;

pub use console::{BuildEngine, ConsoleLogger};
pub use error::LogError;
pub use events::{ErrorEvent, EventSink, EventSource, MessageEvent, WarningEvent};
pub use message::{Importance, LogMessage, LogMessageKind, Verbosity};
pub use queue::LoggingQueue;
pub use relay::{run_worker, CancellationToken, HostLogger, HostRelay, WorkerOutcome};
