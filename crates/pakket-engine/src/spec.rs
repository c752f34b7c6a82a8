//! The normalized, restore-engine-facing data model: one package spec
//! per project, gathered into a frozen aggregate keyed by project path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use pakket_util::{Version, VersionRange};

/// One declared package reference within a target framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub id: String,
    pub version_range: VersionRange,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_referenced: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_assets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_assets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub private_assets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_warn: Vec<String>,
}

/// One package download pinned at an exact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDependency {
    pub id: String,
    pub version_range: VersionRange,
}

/// One shared-framework reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDependency {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub private_assets: Vec<String>,
}

/// One project-to-project reference, by absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    pub path: PathBuf,
}

/// Everything one inner node contributes: its framework name and the
/// references declared under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkInfo {
    pub framework: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PackageDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub download_dependencies: Vec<DownloadDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub framework_references: Vec<FrameworkDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_references: Vec<ProjectReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_identifier_graph_path: Option<PathBuf>,
}

/// How a project declares its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStyle {
    PackageReference,
    PackagesConfig,
    Unknown,
}

impl FromStr for ProjectStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "packagereference" => Ok(ProjectStyle::PackageReference),
            "packagesconfig" => Ok(ProjectStyle::PackagesConfig),
            "unknown" => Ok(ProjectStyle::Unknown),
            other => Err(format!("unknown project style \"{other}\"")),
        }
    }
}

/// Warning-handling properties forwarded to the restore engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningProperties {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub treat_warnings_as_errors: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings_as_errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_warn: Vec<String>,
}

/// Lock-file properties forwarded to the restore engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_packages_with_lock_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub restore_locked_mode: bool,
}

/// The union of runtime identifiers and compatibility profiles declared
/// across a project's nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeGraph {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtimes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<String>,
}

impl RuntimeGraph {
    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty() && self.supports.is_empty()
    }
}

/// Restore settings resolved for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreMetadata {
    pub output_path: PathBuf,
    pub packages_path: PathBuf,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallback_folders: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_paths: Vec<PathBuf>,
    pub style: ProjectStyle,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cross_targeting: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub original_target_frameworks: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_content_file_write: bool,
    pub warning_properties: WarningProperties,
    pub lock_properties: LockProperties,
}

/// The normalized spec for one project (one outer node).
///
/// Invariant: `target_frameworks` has one descriptor per inner node, in
/// inner-node order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub name: String,
    pub file_path: PathBuf,
    pub version: Version,
    pub target_frameworks: Vec<TargetFrameworkInfo>,
    pub restore_metadata: RestoreMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_graph: Option<RuntimeGraph>,
}

/// The aggregate handed to the restore engine: every package spec keyed
/// by project path, plus the entry-point paths restored directly.
///
/// Mutated only during assembly, then treated as frozen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    restore: Vec<PathBuf>,
    projects: BTreeMap<PathBuf, PackageSpec>,
}

impl GraphSpec {
    pub fn new() -> Self {
        GraphSpec::default()
    }

    /// Insert one project spec, keyed by its file path. A later insert
    /// for the same path replaces the earlier one.
    pub fn add_project(&mut self, spec: PackageSpec) {
        self.projects.insert(spec.file_path.clone(), spec);
    }

    /// Mark an entry-point path as directly restorable. Duplicates are
    /// dropped.
    pub fn add_restore(&mut self, path: PathBuf) {
        if !self.restore.contains(&path) {
            self.restore.push(path);
        }
    }

    pub fn project(&self, path: &Path) -> Option<&PackageSpec> {
        self.projects.get(path)
    }

    pub fn projects(&self) -> impl Iterator<Item = &PackageSpec> {
        self.projects.values()
    }

    pub fn restore(&self) -> &[PathBuf] {
        &self.restore
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
