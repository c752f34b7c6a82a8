//! The restore-engine input contract: the option bundle forwarded from
//! the host, the per-project summary shape, and the default engine that
//! persists each restorable project's dependency-graph spec.

use std::path::PathBuf;

use pakket_log::{EventSource, Importance, MessageEvent};
use pakket_util::strings;

use crate::error::EngineError;
use crate::spec::GraphSpec;

/// Flags the restore engine honors, forwarded from the host process as a
/// `key=value;` property string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    pub disable_parallel: bool,
    pub force: bool,
    pub force_evaluate: bool,
    pub hide_warnings_and_errors: bool,
    pub ignore_failed_sources: bool,
    pub interactive: bool,
    pub no_cache: bool,
    pub recursive: bool,
}

impl RestoreOptions {
    /// Encode as a `key=value;` property string for the worker command
    /// line.
    pub fn to_properties(self) -> String {
        format!(
            "DisableParallel={};Force={};ForceEvaluate={};HideWarningsAndErrors={};\
             IgnoreFailedSources={};Interactive={};NoCache={};Recursive={}",
            self.disable_parallel,
            self.force,
            self.force_evaluate,
            self.hide_warnings_and_errors,
            self.ignore_failed_sources,
            self.interactive,
            self.no_cache,
            self.recursive,
        )
    }

    /// Decode a `key=value;` property string. Unknown keys are ignored;
    /// absent keys default to `false`.
    pub fn from_properties(value: &str) -> Self {
        let mut options = RestoreOptions::default();
        for pair in strings::split_delimited(value) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let enabled = strings::is_true(value, false);
            match key.trim().to_ascii_lowercase().as_str() {
                "disableparallel" => options.disable_parallel = enabled,
                "force" => options.force = enabled,
                "forceevaluate" => options.force_evaluate = enabled,
                "hidewarningsanderrors" => options.hide_warnings_and_errors = enabled,
                "ignorefailedsources" => options.ignore_failed_sources = enabled,
                "interactive" => options.interactive = enabled,
                "nocache" => options.no_cache = enabled,
                "recursive" => options.recursive = enabled,
                _ => {}
            }
        }
        options
    }
}

/// The outcome of restoring one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub project: PathBuf,
    pub success: bool,
}

/// The seam the downstream resolver plugs into: consumes the frozen
/// aggregate, returns one summary per restorable project.
pub trait RestoreEngine: Send + Sync {
    /// Restore every project on the aggregate's direct-restore list.
    ///
    /// # Errors
    /// Returns an error only when the engine itself breaks; a failed
    /// project restore is reported through its summary.
    fn restore(
        &self,
        graph: &GraphSpec,
        options: &RestoreOptions,
        events: &EventSource,
    ) -> Result<Vec<RestoreSummary>, EngineError>;
}

/// The shipped engine: writes each restorable project's dependency-graph
/// spec to `<output>/<name>.dgspec.json` and reports success per
/// project. Network resolution plugs in at the same trait seam.
#[derive(Debug, Default)]
pub struct SpecFileWriter;

impl RestoreEngine for SpecFileWriter {
    fn restore(
        &self,
        graph: &GraphSpec,
        options: &RestoreOptions,
        events: &EventSource,
    ) -> Result<Vec<RestoreSummary>, EngineError> {
        let encoded =
            serde_json::to_string_pretty(graph).map_err(|source| EngineError::EncodeSpec { source })?;

        let mut summaries = Vec::with_capacity(graph.restore().len());
        for path in graph.restore() {
            let Some(spec) = graph.project(path) else {
                summaries.push(RestoreSummary {
                    project: path.clone(),
                    success: false,
                });
                continue;
            };

            let output = spec.restore_metadata.output_path.clone();
            std::fs::create_dir_all(&output).map_err(|source| EngineError::WriteSpec {
                path: output.display().to_string(),
                source,
            })?;
            let file = output.join(format!("{}.dgspec.json", spec.name));
            std::fs::write(&file, &encoded).map_err(|source| EngineError::WriteSpec {
                path: file.display().to_string(),
                source,
            })?;

            if !options.hide_warnings_and_errors {
                events.raise_message(MessageEvent::new(
                    Importance::Normal,
                    format!("Wrote dependency graph spec to {}", file.display()),
                ));
            }
            summaries.push(RestoreSummary {
                project: path.clone(),
                success: true,
            });
        }

        Ok(summaries)
    }
}
