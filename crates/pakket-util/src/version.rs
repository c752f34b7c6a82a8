//! Package version and version-range parsing.
//!
//! Ranges use interval notation: `1.2.3` is an inclusive minimum with no
//! upper bound, `[1.2.3]` is an exact pin, `[1.0,2.0)` is a half-open
//! interval. Download references require exact pins, checked via
//! [`VersionRange::is_exact`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::UtilError;

/// A parsed package version: up to four dotted numeric parts plus an
/// optional pre-release label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
    pub pre: Option<String>,
}

impl Version {
    /// Build a plain three-part version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            revision: 0,
            pre: None,
        }
    }

    /// Parse a version string like `1.2.3`, `1.2`, or `1.2.3-beta1`.
    ///
    /// # Errors
    /// Returns an error if the string is empty, has more than four numeric
    /// parts, or contains a non-numeric part.
    pub fn parse(value: &str) -> Result<Self, UtilError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UtilError::InvalidVersion {
                version: value.to_owned(),
                reason: "empty version".to_owned(),
            });
        }

        let (numbers, pre) = match trimmed.split_once('-') {
            Some((numbers, pre)) if !pre.is_empty() => (numbers, Some(pre.to_owned())),
            Some(_) => {
                return Err(UtilError::InvalidVersion {
                    version: value.to_owned(),
                    reason: "empty pre-release label".to_owned(),
                })
            }
            None => (trimmed, None),
        };

        let mut parts = [0u64; 4];
        let mut count = 0;
        for part in numbers.split('.') {
            if count >= 4 {
                return Err(UtilError::InvalidVersion {
                    version: value.to_owned(),
                    reason: "more than four numeric parts".to_owned(),
                });
            }
            let parsed = part.parse::<u64>().map_err(|_| UtilError::InvalidVersion {
                version: value.to_owned(),
                reason: format!("\"{part}\" is not a number"),
            })?;
            if let Some(slot) = parts.get_mut(count) {
                *slot = parsed;
            }
            count += 1;
        }

        Ok(Version {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            revision: parts[3],
            pre,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Version {
    type Error = UtilError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

/// A version range in interval notation.
///
/// The original expression is kept verbatim for serialization and error
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    original: String,
    min: Option<Version>,
    min_inclusive: bool,
    max: Option<Version>,
    max_inclusive: bool,
}

impl VersionRange {
    /// The unbounded range, used when no version expression was supplied.
    pub fn all() -> Self {
        VersionRange {
            original: "(,)".to_owned(),
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
        }
    }

    /// Parse a range expression: a bare version (inclusive minimum), an
    /// exact pin `[1.2.3]`, or an interval like `[1.0,2.0)` where either
    /// bound may be omitted.
    ///
    /// # Errors
    /// Returns an error on mismatched brackets, more than two bounds, or a
    /// malformed bound version.
    pub fn parse(value: &str) -> Result<Self, UtilError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(VersionRange::all());
        }

        let starts_interval = trimmed.starts_with('[') || trimmed.starts_with('(');
        if !starts_interval {
            // Bare version: inclusive minimum, unbounded above.
            let min = Version::parse(trimmed)?;
            return Ok(VersionRange {
                original: trimmed.to_owned(),
                min: Some(min),
                min_inclusive: true,
                max: None,
                max_inclusive: false,
            });
        }

        let min_inclusive = trimmed.starts_with('[');
        let max_inclusive = trimmed.ends_with(']');
        if !max_inclusive && !trimmed.ends_with(')') {
            return Err(UtilError::InvalidVersionRange {
                range: value.to_owned(),
                reason: "interval does not end with ']' or ')'".to_owned(),
            });
        }

        let inner = trimmed
            .get(1..trimmed.len() - 1)
            .unwrap_or_default()
            .trim();

        let bounds: Vec<&str> = inner.split(',').collect();
        let (min_text, max_text) = match bounds.as_slice() {
            [single] => {
                // A single bound is only meaningful as an exact pin.
                if !(min_inclusive && max_inclusive) {
                    return Err(UtilError::InvalidVersionRange {
                        range: value.to_owned(),
                        reason: "a single-bound interval must use '[' and ']'".to_owned(),
                    });
                }
                (*single, *single)
            }
            [min, max] => (*min, *max),
            _ => {
                return Err(UtilError::InvalidVersionRange {
                    range: value.to_owned(),
                    reason: "more than two bounds".to_owned(),
                })
            }
        };

        let min = parse_bound(value, min_text)?;
        let max = parse_bound(value, max_text)?;

        Ok(VersionRange {
            original: trimmed.to_owned(),
            min,
            min_inclusive,
            max,
            max_inclusive,
        })
    }

    /// Whether this range pins a single version, e.g. `[1.2.3]`.
    pub fn is_exact(&self) -> bool {
        self.min_inclusive
            && self.max_inclusive
            && self.min.is_some()
            && self.min == self.max
    }

    /// The lower bound, if any.
    pub fn min(&self) -> Option<&Version> {
        self.min.as_ref()
    }

    /// The upper bound, if any.
    pub fn max(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    /// The range expression as originally written.
    pub fn original(&self) -> &str {
        &self.original
    }
}

fn parse_bound(range: &str, text: &str) -> Result<Option<Version>, UtilError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let version = Version::parse(trimmed).map_err(|e| UtilError::InvalidVersionRange {
        range: range.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(Some(version))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = UtilError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VersionRange::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.original
    }
}
