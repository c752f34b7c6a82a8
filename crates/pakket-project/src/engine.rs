//! The engine seam: evaluation of build definitions and restricted target
//! execution live behind [`ProjectEngine`] so the graph walk never depends
//! on a concrete evaluator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;
use crate::model::EvaluatedProject;

/// Engine behavior fixed once at process start.
///
/// These replace ambient environment-variable feature flags: the values are
/// decided by the entry point and passed in, never read back out of global
/// state by core logic.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Skip expansion of eager wildcard item specs during evaluation.
    pub skip_wildcard_expansion: bool,
    /// Load project files read-only (no editing support, faster parse).
    pub load_projects_read_only: bool,
    /// Explicit path to the evaluation engine, when not self-hosted.
    pub engine_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            skip_wildcard_expansion: true,
            load_projects_read_only: true,
            engine_path: None,
        }
    }
}

/// Outcome of a restricted build: best-effort, so failure is data rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    Failed,
}

/// A build-definition evaluator.
///
/// Implementations must be shareable across threads: the graph walk runs
/// restricted builds on a worker pool while evaluation continues.
pub trait ProjectEngine: Send + Sync {
    /// Load and evaluate the build definition at `path` under the given
    /// global property bindings.
    ///
    /// # Errors
    /// Returns an error if the definition cannot be read or evaluated.
    /// Evaluation errors abort graph construction; they are not retried.
    fn evaluate(
        &self,
        path: &Path,
        global_properties: &BTreeMap<String, String>,
    ) -> Result<EvaluatedProject, ProjectError>;

    /// Run a restricted, best-effort build of the named targets against an
    /// evaluated node to populate computed items. Nonexistent targets are
    /// skipped, not failed.
    ///
    /// # Errors
    /// Returns an error only when the engine itself breaks; an ordinary
    /// target failure is reported through [`BuildOutcome::Failed`].
    fn run_targets(
        &self,
        project: &EvaluatedProject,
        targets: &[&str],
    ) -> Result<BuildOutcome, ProjectError>;
}
