//! Restore settings resolution.
//!
//! Settings come from `pakket.toml` files discovered by walking from a
//! start directory up to the filesystem root. The nearest file wins per
//! field; every file found is recorded in `config_paths` so specs can
//! report which configuration shaped them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use pakket_util::UtilError;

/// The settings file name searched for in each ancestor directory.
pub const SETTINGS_FILE_NAME: &str = "pakket.toml";

/// The package source used when no configuration declares any.
pub const DEFAULT_SOURCE: &str = "https://registry.pakket.dev/index.json";

/// Resolved ambient settings for a restore run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Enabled package sources, in precedence order.
    pub sources: Vec<String>,
    /// Fallback package folders consulted before sources.
    pub fallback_folders: Vec<String>,
    /// The package cache directory.
    pub packages_path: PathBuf,
    /// Every settings file that contributed, nearest first.
    pub config_paths: Vec<PathBuf>,
}

/// On-disk shape of one `pakket.toml`.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    restore: RestoreSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RestoreSection {
    sources: Option<Vec<String>>,
    fallback_folders: Option<Vec<String>>,
    packages_path: Option<String>,
}

impl Settings {
    /// Load settings for a restore starting at `start_dir`.
    ///
    /// `config_file` short-circuits discovery: when given, only that file
    /// is read. Otherwise every `pakket.toml` from `start_dir` upward
    /// contributes, nearest file winning per field.
    ///
    /// # Errors
    /// Returns an error if a settings file cannot be read or parsed, or if
    /// no package cache directory can be derived (no configured path and
    /// no home directory).
    pub fn load(start_dir: &Path, config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut files = Vec::new();

        if let Some(path) = config_file {
            files.push((path.to_path_buf(), read_settings_file(path)?));
        } else {
            for dir in start_dir.ancestors() {
                let candidate = dir.join(SETTINGS_FILE_NAME);
                if candidate.is_file() {
                    let parsed = read_settings_file(&candidate)?;
                    files.push((candidate, parsed));
                }
            }
        }

        let sources = files
            .iter()
            .find_map(|(_, f)| f.restore.sources.clone())
            .unwrap_or_else(|| vec![DEFAULT_SOURCE.to_owned()]);

        let fallback_folders = files
            .iter()
            .find_map(|(_, f)| f.restore.fallback_folders.clone())
            .unwrap_or_default();

        let packages_path = match files.iter().find_map(|(path, f)| {
            f.restore
                .packages_path
                .as_ref()
                .and_then(|value| default_base_dir(path).map(|base| (base, value.clone())))
        }) {
            Some((base, value)) => pakket_util::paths::absolutize(&base, Path::new(&value)),
            None => default_packages_path()?,
        };

        Ok(Settings {
            sources,
            fallback_folders,
            packages_path,
            config_paths: files.into_iter().map(|(path, _)| path).collect(),
        })
    }
}

fn default_base_dir(settings_file: &Path) -> Option<PathBuf> {
    settings_file.parent().map(Path::to_path_buf)
}

fn read_settings_file(path: &Path) -> Result<SettingsFile, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn default_packages_path() -> Result<PathBuf, SettingsError> {
    let home = std::env::var_os("HOME").ok_or(SettingsError::Util(UtilError::NoHomeDir))?;
    Ok(PathBuf::from(home).join(".pakket").join("packages"))
}

/// Errors produced while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A settings file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// A settings file contains invalid TOML.
    #[error("invalid pakket.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] UtilError),
}
