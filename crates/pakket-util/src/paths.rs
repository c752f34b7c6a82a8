//! Lexical path resolution.
//!
//! Spec extraction resolves property values like output paths and source
//! folders against a base directory. The targets frequently do not exist
//! yet, so resolution is purely lexical — no filesystem access, no symlink
//! following.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base`, normalizing `.` and `..` components.
///
/// Absolute paths are normalized as-is; relative paths are joined onto
/// `base` first. `..` at the root is dropped rather than kept.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    // Nothing left to pop; `..` above the root is dropped.
                }
            }
            other => normalized.push(other),
        }
    }

    normalized
}

/// Resolve a string-valued path against a base directory.
///
/// Returns `None` when the value is blank, so callers can fall through to
/// the next link in a precedence chain.
pub fn absolutize_value(base: &Path, value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(absolutize(base, Path::new(trimmed)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relative_joined_to_base() {
        assert_eq!(
            absolutize(Path::new("/work/project"), Path::new("obj")),
            PathBuf::from("/work/project/obj")
        );
    }

    #[test]
    fn absolute_passes_through() {
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("/other/dir")),
            PathBuf::from("/other/dir")
        );
    }

    #[test]
    fn dot_and_dotdot_normalized() {
        assert_eq!(
            absolutize(Path::new("/work/project"), Path::new("../shared/./packages")),
            PathBuf::from("/work/shared/packages")
        );
    }

    #[test]
    fn dotdot_above_root_dropped() {
        assert_eq!(
            absolutize(Path::new("/"), Path::new("../../etc")),
            PathBuf::from("/etc")
        );
    }

    #[test]
    fn blank_value_is_none() {
        assert!(absolutize_value(Path::new("/work"), "  ").is_none());
        assert_eq!(
            absolutize_value(Path::new("/work"), "obj"),
            Some(PathBuf::from("/work/obj"))
        );
    }
}
