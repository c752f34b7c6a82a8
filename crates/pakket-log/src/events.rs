//! In-process diagnostic events and the sink/source plumbing that routes
//! them to subscribed loggers.

use std::sync::{Arc, Mutex};

use crate::message::Importance;

/// A build error raised by evaluation or assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    pub subcategory: Option<String>,
    pub code: Option<String>,
    pub help_keyword: Option<String>,
    pub file: Option<String>,
    pub line_number: u32,
    pub column_number: u32,
    pub end_line_number: u32,
    pub end_column_number: u32,
    pub message: String,
    pub project_file: Option<String>,
    pub sender_name: Option<String>,
}

impl ErrorEvent {
    /// A bare textual error with no location or code attached.
    pub fn text(message: impl Into<String>) -> Self {
        ErrorEvent {
            message: message.into(),
            ..ErrorEvent::default()
        }
    }
}

/// A build warning. Shares the shape of [`ErrorEvent`]; warnings never
/// fail the build on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningEvent {
    pub subcategory: Option<String>,
    pub code: Option<String>,
    pub help_keyword: Option<String>,
    pub file: Option<String>,
    pub line_number: u32,
    pub column_number: u32,
    pub end_line_number: u32,
    pub end_column_number: u32,
    pub message: String,
    pub project_file: Option<String>,
    pub sender_name: Option<String>,
}

/// An informational message with a filtering importance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub message: String,
    pub importance: Importance,
    pub sender_name: Option<String>,
}

impl MessageEvent {
    pub fn new(importance: Importance, message: impl Into<String>) -> Self {
        MessageEvent {
            message: message.into(),
            importance,
            sender_name: None,
        }
    }
}

/// A receiver of diagnostic events. Implementations must tolerate calls
/// from multiple threads.
pub trait EventSink: Send + Sync {
    fn error_raised(&self, event: ErrorEvent);
    fn warning_raised(&self, event: WarningEvent);
    fn message_raised(&self, event: MessageEvent);
}

/// Fans raised events out to every subscribed sink.
#[derive(Default)]
pub struct EventSource {
    sinks: Mutex<Vec<Arc<dyn EventSink>>>,
}

impl EventSource {
    pub fn new() -> Self {
        EventSource::default()
    }

    /// Add a sink. A sink subscribed twice receives each event twice.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.push(sink);
        }
    }

    /// Remove a previously subscribed sink by identity. Removing a sink
    /// that is not subscribed is a no-op.
    pub fn unsubscribe(&self, sink: &Arc<dyn EventSink>) {
        if let Ok(mut sinks) = self.sinks.lock() {
            if let Some(position) = sinks.iter().position(|s| Arc::ptr_eq(s, sink)) {
                sinks.remove(position);
            }
        }
    }

    pub fn raise_error(&self, event: ErrorEvent) {
        if let Ok(sinks) = self.sinks.lock() {
            for sink in sinks.iter() {
                sink.error_raised(event.clone());
            }
        }
    }

    pub fn raise_warning(&self, event: WarningEvent) {
        if let Ok(sinks) = self.sinks.lock() {
            for sink in sinks.iter() {
                sink.warning_raised(event.clone());
            }
        }
    }

    pub fn raise_message(&self, event: MessageEvent) {
        if let Ok(sinks) = self.sinks.lock() {
            for sink in sinks.iter() {
                sink.message_raised(event.clone());
            }
        }
    }
}
