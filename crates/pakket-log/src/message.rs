//! The structured log-message record and its single-line wire encoding.
//!
//! One message is one compact JSON object on one line. Absent and
//! default-valued fields are omitted on serialization and restored to
//! their defaults on deserialization, keeping common informational
//! messages minimal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::events::{ErrorEvent, MessageEvent, WarningEvent};

/// Ordinal informational-message severity, used purely for verbosity
/// filtering. Distinct from error/warning severity, which is never
/// filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Normal,
    High,
}

impl Default for Importance {
    fn default() -> Self {
        Importance::Normal
    }
}

impl Importance {
    fn is_default(&self) -> bool {
        *self == Importance::default()
    }
}

/// Logging verbosity requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Minimal,
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    /// The minimum importance an informational message needs to be
    /// admitted at this verbosity.
    pub fn minimum_importance(self) -> Importance {
        match self {
            Verbosity::Quiet | Verbosity::Minimal => Importance::High,
            Verbosity::Normal => Importance::Normal,
            Verbosity::Detailed | Verbosity::Diagnostic => Importance::Low,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Minimal => "minimal",
            Verbosity::Normal => "normal",
            Verbosity::Detailed => "detailed",
            Verbosity::Diagnostic => "diagnostic",
        };
        f.write_str(name)
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" | "q" => Ok(Verbosity::Quiet),
            "minimal" | "m" => Ok(Verbosity::Minimal),
            "normal" | "n" => Ok(Verbosity::Normal),
            "detailed" | "d" => Ok(Verbosity::Detailed),
            "diagnostic" | "diag" => Ok(Verbosity::Diagnostic),
            other => Err(format!("unknown verbosity \"{other}\"")),
        }
    }
}

/// Discriminant of a [`LogMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMessageKind {
    Error,
    Warning,
    Message,
}

impl Default for LogMessageKind {
    fn default() -> Self {
        LogMessageKind::Message
    }
}

/// One severity-tagged diagnostic record crossing the process boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    #[serde(default)]
    pub message_type: LogMessageKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Importance::is_default")]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line_number: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub column_number: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_line_number: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_column_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl LogMessage {
    /// Build an error-kind message from an error event.
    pub fn from_error_event(event: ErrorEvent) -> Self {
        LogMessage {
            message_type: LogMessageKind::Error,
            message: event.message,
            code: event.code,
            file: event.file,
            line_number: event.line_number,
            column_number: event.column_number,
            end_line_number: event.end_line_number,
            end_column_number: event.end_column_number,
            help_keyword: event.help_keyword,
            project_file: event.project_file,
            sender_name: event.sender_name,
            subcategory: event.subcategory,
            ..LogMessage::default()
        }
    }

    /// Build a warning-kind message from a warning event.
    pub fn from_warning_event(event: WarningEvent) -> Self {
        LogMessage {
            message_type: LogMessageKind::Warning,
            message: event.message,
            code: event.code,
            file: event.file,
            line_number: event.line_number,
            column_number: event.column_number,
            end_line_number: event.end_line_number,
            end_column_number: event.end_column_number,
            help_keyword: event.help_keyword,
            project_file: event.project_file,
            sender_name: event.sender_name,
            subcategory: event.subcategory,
            ..LogMessage::default()
        }
    }

    /// Build a message-kind record from an informational event. Only the
    /// text and importance cross the boundary.
    pub fn from_message_event(event: MessageEvent) -> Self {
        LogMessage {
            message_type: LogMessageKind::Message,
            message: event.message,
            importance: event.importance,
            ..LogMessage::default()
        }
    }
}
