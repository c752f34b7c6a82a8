//! A generic, ordered, asynchronous single-consumer processor.
//!
//! Producers enqueue from any thread; one background worker drains items
//! strictly in acceptance order and hands each to the injected handler.
//! This is the only synchronization point for diagnostic output — worker
//! threads never write to the output stream directly.

use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;

/// An ordered single-consumer queue over an injected item handler.
pub struct LoggingQueue<T: Send + 'static> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    sender: Option<Sender<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> LoggingQueue<T> {
    /// Start the queue with a handler that processes one item at a time.
    ///
    /// The handler runs on a dedicated worker thread; it is never invoked
    /// concurrently with itself from the same queue instance.
    pub fn new<F>(mut process: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<T>();

        let worker = std::thread::spawn(move || {
            while let Ok(item) = receiver.recv() {
                process(item);
            }
        });

        LoggingQueue {
            inner: Mutex::new(Inner {
                sender: Some(sender),
                worker: Some(worker),
            }),
        }
    }

    /// Accept an item for processing.
    ///
    /// Returns `false` once the queue has been shut down; this is a
    /// post-shutdown no-op, not an error.
    pub fn enqueue(&self, item: T) -> bool {
        let Ok(inner) = self.inner.lock() else {
            return false;
        };
        match &inner.sender {
            Some(sender) => sender.send(item).is_ok(),
            None => false,
        }
    }

    /// Stop accepting new items and wait until every accepted item has
    /// been processed. Idempotent.
    pub fn shutdown(&self) {
        let (sender, worker) = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            (inner.sender.take(), inner.worker.take())
        };

        // Dropping the sender closes the channel; the worker drains the
        // backlog and exits.
        drop(sender);

        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

impl<T: Send + 'static> Drop for LoggingQueue<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
