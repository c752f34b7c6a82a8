//! Error types for pakket-project.

/// Errors produced by the project engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// A project or solution file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// A project file contains invalid XML.
    #[error("invalid project XML at {path}: {message}")]
    Parse { path: String, message: String },

    /// A project file is well-formed XML but not a build definition.
    #[error("{path} is not a build definition: {reason}")]
    InvalidProject { path: String, reason: String },

    /// A solution file entry is malformed.
    #[error("invalid solution entry in {path}: {line}")]
    InvalidSolutionEntry { path: String, line: String },
}
