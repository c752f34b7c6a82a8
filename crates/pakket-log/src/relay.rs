//! Host-side relay: runs the worker process, reads its output line by
//! line, and replays structured messages into the host's own logging.
//!
//! Lines that look like JSON objects are decoded into [`LogMessage`]s;
//! anything else is forwarded verbatim as low-importance text, so a
//! worker that prints a panic message or stray diagnostics still gets
//! heard.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use crate::error::LogError;
use crate::message::{Importance, LogMessage, LogMessageKind};
use crate::queue::LoggingQueue;

/// The host's presentation surface for relayed diagnostics.
pub trait HostLogger: Send + Sync {
    fn error(&self, message: &LogMessage);
    fn warning(&self, message: &LogMessage);
    fn message(&self, text: &str, importance: Importance);
}

/// Decodes worker output lines in order and dispatches them to a
/// [`HostLogger`].
pub struct HostRelay {
    queue: LoggingQueue<String>,
}

impl HostRelay {
    pub fn new(logger: Arc<dyn HostLogger>) -> Self {
        let queue = LoggingQueue::new(move |line: String| {
            HostRelay::process_line(logger.as_ref(), &line);
        });
        HostRelay { queue }
    }

    /// Accept one raw output line for ordered processing.
    pub fn enqueue_line(&self, line: String) -> bool {
        self.queue.enqueue(line)
    }

    /// Flush and stop. Idempotent.
    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    fn process_line(logger: &dyn HostLogger, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        // Only lines shaped like a JSON object are candidates for the
        // structured format; a parse failure degrades to free text.
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            if let Ok(message) = serde_json::from_str::<LogMessage>(trimmed) {
                match message.message_type {
                    LogMessageKind::Error => logger.error(&message),
                    LogMessageKind::Warning => logger.warning(&message),
                    LogMessageKind::Message => {
                        logger.message(&message.message, message.importance);
                    }
                }
                return;
            }
        }

        logger.message(trimmed, Importance::Low);
    }
}

/// How a relayed worker run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The worker ran to completion on its own.
    Exited { success: bool, code: Option<i32> },
    /// The worker was killed because cancellation was requested.
    Cancelled,
}

enum WorkerEvent {
    OutputClosed,
    Cancelled,
}

/// A cooperatively checked cancellation signal that can also wake a
/// blocked [`run_worker`] call.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    next_waiter: AtomicU64,
    waiters: Mutex<Vec<(u64, Sender<WorkerEvent>)>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation and wake every registered waiter. Woken
    /// waiters are dropped; the token stays cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(mut waiters) = self.waiters.lock() {
            for (_, waiter) in waiters.drain(..) {
                let _ = waiter.send(WorkerEvent::Cancelled);
            }
        }
    }

    fn register(&self, waiter: Sender<WorkerEvent>) -> u64 {
        let id = self.next_waiter.fetch_add(1, Ordering::SeqCst);
        if self.is_cancelled() {
            // Already cancelled; wake immediately instead of parking the
            // sender for a signal that will never come again.
            let _ = waiter.send(WorkerEvent::Cancelled);
            return id;
        }
        if let Ok(mut waiters) = self.waiters.lock() {
            waiters.push((id, waiter));
        }
        id
    }

    /// Drop one registration so a token outliving its worker does not
    /// accumulate dead senders.
    fn deregister(&self, id: u64) {
        if let Ok(mut waiters) = self.waiters.lock() {
            waiters.retain(|(waiter_id, _)| *waiter_id != id);
        }
    }
}

/// Spawn the worker process described by `command`, relay its output
/// until it exits or cancellation is requested, and report the outcome.
///
/// The worker's stdout is captured; its stdin is closed immediately so a
/// worker that reads input sees end-of-file rather than hanging; stderr
/// is inherited and flows straight to the host's stderr.
pub fn run_worker(
    mut command: Command,
    logger: Arc<dyn HostLogger>,
    cancellation: &CancellationToken,
) -> Result<WorkerOutcome, LogError> {
    let relay = HostRelay::new(logger);

    let mut child = command
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LogError::Spawn { source })?;

    // Closing stdin right away signals the worker not to wait for input.
    drop(child.stdin.take());

    let stdout = child.stdout.take().ok_or(LogError::NoWorkerOutput)?;

    let (events_tx, events_rx) = mpsc::channel::<WorkerEvent>();
    let registration = cancellation.register(events_tx.clone());

    let reader = {
        let events_tx = events_tx.clone();
        std::thread::spawn(move || {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(Ok(line)) = lines.next() {
                relay.enqueue_line(line);
            }
            relay.shutdown();
            let _ = events_tx.send(WorkerEvent::OutputClosed);
        })
    };

    let outcome = match events_rx.recv() {
        Ok(WorkerEvent::OutputClosed) | Err(_) => {
            let status = child.wait().map_err(|source| LogError::Wait { source })?;
            WorkerOutcome::Exited {
                success: status.success(),
                code: status.code(),
            }
        }
        Ok(WorkerEvent::Cancelled) => {
            let _ = child.kill();
            let _ = child.wait();
            WorkerOutcome::Cancelled
        }
    };

    let _ = reader.join();
    cancellation.deregister(registration);
    Ok(outcome)
}
