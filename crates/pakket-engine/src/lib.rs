#![forbid(unsafe_code)]
//! Graph evaluation and dependency-graph spec assembly: walks the
//! transitive reference graph from a set of entry points, groups
//! multi-targeted nodes, extracts one normalized package spec per
//! project, and freezes the aggregate handed to the restore engine.

pub mod assemble;
pub mod error;
pub mod graph;
pub mod restore;
pub mod spec;

pub use assemble::{assemble, AssemblyContext};
pub use error::EngineError;
pub use graph::{
    evaluate_graph, expand_entry_points, EntryPoint, GraphOptions, ProjectGroup,
    RESTRICTED_BUILD_TARGETS,
};
pub use restore::{RestoreEngine, RestoreOptions, RestoreSummary, SpecFileWriter};
pub use spec::{
    DownloadDependency, FrameworkDependency, GraphSpec, LockProperties, PackageDependency,
    PackageSpec, ProjectReference, ProjectStyle, RestoreMetadata, RuntimeGraph,
    TargetFrameworkInfo, WarningProperties,
};
