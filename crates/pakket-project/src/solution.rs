//! Solution-file expansion.
//!
//! A solution names a set of member projects. At graph-construction time
//! each build-format member becomes its own entry point; non-project
//! entries (solution folders, site references) are skipped.

use std::path::{Path, PathBuf};

use pakket_util::paths;

use crate::error::ProjectError;

/// File extension identifying a solution.
pub const SOLUTION_EXTENSION: &str = "sln";

/// Whether a path names a solution file.
pub fn is_solution(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOLUTION_EXTENSION))
}

/// Parse a solution file and return the absolute paths of its
/// build-format member projects, in declaration order.
///
/// Member entries look like:
/// `Project("{GUID}") = "name", "relative\path\app.proj", "{GUID}"`.
/// Entries whose path does not end in a `proj` extension are not build
/// definitions and are skipped.
///
/// # Errors
/// Returns an error if the file cannot be read or a `Project(` entry is
/// malformed.
pub fn expand_solution(path: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let base = path.parent().unwrap_or(Path::new("."));
    let mut projects = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with("Project(") {
            continue;
        }

        let relative = project_entry_path(trimmed).ok_or_else(|| {
            ProjectError::InvalidSolutionEntry {
                path: path.display().to_string(),
                line: trimmed.to_owned(),
            }
        })?;

        if !is_build_format(&relative) {
            continue;
        }

        // Solution files carry backslash separators regardless of host.
        let normalized = relative.replace('\\', "/");
        projects.push(paths::absolutize(base, Path::new(&normalized)));
    }

    Ok(projects)
}

/// Extract the second quoted value (the member path) from a `Project(`
/// entry.
fn project_entry_path(line: &str) -> Option<String> {
    let (_, rhs) = line.split_once('=')?;
    let mut quoted = rhs.split('"').skip(1).step_by(2);
    let _name = quoted.next()?;
    quoted.next().map(ToOwned::to_owned)
}

fn is_build_format(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.to_ascii_lowercase().ends_with("proj"))
}
