//! Error types for pakket-engine.

use pakket_project::ProjectError;
use pakket_util::UtilError;

/// Errors produced by graph evaluation, spec assembly, and spec writing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project engine failed to load or evaluate a node.
    #[error("{0}")]
    Project(#[from] ProjectError),

    /// A version or version-range expression could not be parsed.
    #[error("{0}")]
    Util(#[from] UtilError),

    /// A package-download reference carries a range instead of an exact
    /// pinned version.
    #[error(
        "package download \"{id}\" in {project} must pin an exact version \
         like \"[1.2.3]\", got \"{range}\""
    )]
    InexactDownloadVersion {
        project: String,
        id: String,
        range: String,
    },

    /// One or more restricted builds failed after evaluation completed.
    #[error("{count} restricted build(s) failed")]
    RestrictedBuildsFailed { count: usize },

    /// The bounded worker pool could not be created.
    #[error("cannot create worker pool: {message}")]
    WorkerPool { message: String },

    /// A dependency-graph spec file could not be written.
    #[error("cannot write {path}: {source}")]
    WriteSpec {
        path: String,
        source: std::io::Error,
    },

    /// The assembled spec could not be encoded.
    #[error("cannot encode dependency graph spec: {source}")]
    EncodeSpec { source: serde_json::Error },
}
