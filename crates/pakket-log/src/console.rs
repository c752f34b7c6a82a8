//! Worker-side console logger.
//!
//! Every admitted event becomes one JSON line on the output stream,
//! written by the logging queue's single consumer so that lines from
//! concurrent evaluation threads never interleave.

use std::io::Write;
use std::sync::Arc;

use crate::events::{ErrorEvent, EventSink, EventSource, MessageEvent, WarningEvent};
use crate::message::{Importance, LogMessage, Verbosity};
use crate::queue::LoggingQueue;

/// The per-task logging surface handed to evaluation work. The graph
/// evaluator has no real task host, so the positional queries answer
/// with fixed values.
pub trait BuildEngine: Send + Sync {
    fn line_number_of_task_node(&self) -> u32 {
        0
    }

    fn column_number_of_task_node(&self) -> u32 {
        0
    }

    fn continue_on_error(&self) -> bool {
        false
    }

    fn project_file_of_task_node(&self) -> Option<String> {
        None
    }

    fn log_error_event(&self, event: ErrorEvent);
    fn log_warning_event(&self, event: WarningEvent);
    fn log_message_event(&self, event: MessageEvent);
}

/// Serializes diagnostics to the output stream as JSON lines.
///
/// Errors and warnings are always emitted; informational messages are
/// admitted only when their importance meets the verbosity's minimum.
pub struct ConsoleLogger {
    queue: LoggingQueue<LogMessage>,
    verbosity: Verbosity,
    min_importance: Importance,
}

impl ConsoleLogger {
    /// A logger writing to the process's standard output.
    pub fn new(verbosity: Verbosity) -> Self {
        ConsoleLogger::with_writer(verbosity, Box::new(std::io::stdout()))
    }

    /// A logger writing to an arbitrary sink. Used by tests to capture
    /// output.
    pub fn with_writer(verbosity: Verbosity, mut writer: Box<dyn Write + Send>) -> Self {
        let queue = LoggingQueue::new(move |message: LogMessage| {
            if let Ok(line) = serde_json::to_string(&message) {
                let _ = writeln!(writer, "{line}");
                let _ = writer.flush();
            }
        });

        ConsoleLogger {
            queue,
            verbosity,
            min_importance: verbosity.minimum_importance(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Attach this logger to an event source.
    pub fn initialize(self: &Arc<Self>, source: &EventSource) {
        source.subscribe(self.clone() as Arc<dyn EventSink>);
    }

    /// Detach this logger from an event source.
    pub fn shutdown_subscription(self: &Arc<Self>, source: &EventSource) {
        let sink: Arc<dyn EventSink> = self.clone() as Arc<dyn EventSink>;
        source.unsubscribe(&sink);
    }

    /// Queue a message directly, bypassing the event plumbing. Errors and
    /// warnings always pass; informational messages are still filtered.
    pub fn log(&self, message: LogMessage) {
        if message.message_type == crate::message::LogMessageKind::Message
            && message.importance < self.min_importance
        {
            return;
        }
        self.queue.enqueue(message);
    }

    /// Convenience for an informational line at the given importance.
    pub fn log_message(&self, importance: Importance, text: impl Into<String>) {
        self.message_raised(MessageEvent::new(importance, text));
    }

    /// Convenience for a bare textual error.
    pub fn log_error(&self, text: impl Into<String>) {
        self.error_raised(ErrorEvent::text(text));
    }

    /// Flush and stop the queue. Call before process exit so no accepted
    /// line is lost.
    pub fn drain(&self) {
        self.queue.shutdown();
    }
}

impl EventSink for ConsoleLogger {
    fn error_raised(&self, event: ErrorEvent) {
        self.queue.enqueue(LogMessage::from_error_event(event));
    }

    fn warning_raised(&self, event: WarningEvent) {
        self.queue.enqueue(LogMessage::from_warning_event(event));
    }

    fn message_raised(&self, event: MessageEvent) {
        if event.importance < self.min_importance {
            return;
        }
        self.queue.enqueue(LogMessage::from_message_event(event));
    }
}

impl BuildEngine for ConsoleLogger {
    fn log_error_event(&self, event: ErrorEvent) {
        self.error_raised(event);
    }

    fn log_warning_event(&self, event: WarningEvent) {
        self.warning_raised(event);
    }

    fn log_message_event(&self, event: MessageEvent) {
        self.message_raised(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use crate::message::LogMessageKind;

    use super::*;

    /// A writer that appends into a shared buffer.
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(verbosity: Verbosity) -> (ConsoleLogger, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let logger =
            ConsoleLogger::with_writer(verbosity, Box::new(SharedWriter(Arc::clone(&buffer))));
        (logger, buffer)
    }

    fn lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<LogMessage> {
        let raw = buffer.lock().unwrap().clone();
        String::from_utf8(raw)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn errors_and_warnings_pass_at_quiet() {
        let (logger, buffer) = capture(Verbosity::Quiet);
        logger.error_raised(ErrorEvent::text("boom"));
        logger.warning_raised(WarningEvent {
            message: "careful".to_owned(),
            ..WarningEvent::default()
        });
        logger.message_raised(MessageEvent::new(Importance::Normal, "hidden"));
        logger.drain();

        let seen = lines(&buffer);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.first().unwrap().message_type, LogMessageKind::Error);
        assert_eq!(seen.get(1).unwrap().message_type, LogMessageKind::Warning);
    }

    #[test]
    fn normal_verbosity_drops_low_importance() {
        let (logger, buffer) = capture(Verbosity::Normal);
        logger.log_message(Importance::Low, "trace detail");
        logger.log_message(Importance::Normal, "progress");
        logger.log_message(Importance::High, "headline");
        logger.drain();

        let seen = lines(&buffer);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.first().unwrap().message, "progress");
        assert_eq!(seen.get(1).unwrap().message, "headline");
    }

    #[test]
    fn detailed_verbosity_admits_everything() {
        let (logger, buffer) = capture(Verbosity::Detailed);
        logger.log_message(Importance::Low, "trace detail");
        logger.drain();

        assert_eq!(lines(&buffer).len(), 1);
    }

    #[test]
    fn output_is_one_json_object_per_line() {
        let (logger, buffer) = capture(Verbosity::Diagnostic);
        for i in 0..10 {
            logger.log_message(Importance::Normal, format!("line {i}"));
        }
        logger.drain();

        let raw = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let parsed: Vec<&str> = raw.lines().collect();
        assert_eq!(parsed.len(), 10);
        for (i, line) in parsed.iter().enumerate() {
            assert!(line.starts_with('{') && line.ends_with('}'));
            let message: LogMessage = serde_json::from_str(line).unwrap();
            assert_eq!(message.message, format!("line {i}"));
        }
    }

    #[test]
    fn direct_log_filters_informational_messages() {
        let (logger, buffer) = capture(Verbosity::Minimal);
        logger.log(LogMessage {
            message: "low detail".to_owned(),
            importance: Importance::Low,
            ..LogMessage::default()
        });
        logger.log(LogMessage {
            message_type: LogMessageKind::Error,
            message: "always".to_owned(),
            ..LogMessage::default()
        });
        logger.drain();

        let seen = lines(&buffer);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.first().unwrap().message, "always");
    }

    #[test]
    fn subscription_is_detachable() {
        let (logger, buffer) = capture(Verbosity::Detailed);
        let logger = Arc::new(logger);
        let source = EventSource::new();

        logger.initialize(&source);
        source.raise_message(MessageEvent::new(Importance::Normal, "first"));
        logger.shutdown_subscription(&source);
        source.raise_message(MessageEvent::new(Importance::Normal, "second"));
        logger.drain();

        let seen = lines(&buffer);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.first().unwrap().message, "first");
    }

    #[test]
    fn build_engine_defaults_describe_no_task_node() {
        let (logger, _buffer) = capture(Verbosity::Normal);
        let engine: &dyn BuildEngine = &logger;
        assert_eq!(engine.line_number_of_task_node(), 0);
        assert_eq!(engine.column_number_of_task_node(), 0);
        assert!(!engine.continue_on_error());
        assert!(engine.project_file_of_task_node().is_none());
    }
}
