#![forbid(unsafe_code)]
//! String, path, and version utilities for pakket.

pub mod error;
pub mod paths;
pub mod strings;
pub mod version;

pub use error::UtilError;
pub use version::{Version, VersionRange};
