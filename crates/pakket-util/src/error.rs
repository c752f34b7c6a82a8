//! Error types for pakket-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// A version string is malformed.
    #[error("invalid version \"{version}\": {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A version range expression is malformed.
    #[error("invalid version range \"{range}\": {reason}")]
    InvalidVersionRange { range: String, reason: String },

    /// Cannot determine the user's home directory.
    #[error("cannot determine home directory; set the HOME environment variable")]
    NoHomeDir,
}
