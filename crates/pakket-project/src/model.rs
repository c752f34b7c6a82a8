//! The evaluated-project model: a property bag plus item collections, as
//! returned by a [`crate::ProjectEngine`] for one (path, global-properties)
//! pair.

use std::collections::BTreeMap;
use std::path::PathBuf;

use pakket_util::strings;

/// One evaluated item: an identity (`include`) plus string metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    /// The evaluated item identity, e.g. a package id or a referenced
    /// project path.
    pub include: String,
    /// Evaluated metadata values keyed by name.
    pub metadata: BTreeMap<String, String>,
}

impl ProjectItem {
    /// Build an item with no metadata.
    pub fn new(include: impl Into<String>) -> Self {
        ProjectItem {
            include: include.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// The metadata value for `name`, or `""` when absent.
    pub fn metadata_value(&self, name: &str) -> &str {
        lookup(&self.metadata, name).unwrap_or("")
    }

    /// Whether metadata `name` is `true`, falling back to `default` when
    /// blank or absent.
    pub fn is_metadata_true(&self, name: &str, default: bool) -> bool {
        strings::is_true(self.metadata_value(name), default)
    }
}

/// One evaluated build definition at a specific set of global property
/// bindings.
#[derive(Debug, Clone)]
pub struct EvaluatedProject {
    /// Full path to the project file.
    pub path: PathBuf,
    /// The project file's directory.
    pub directory: PathBuf,
    /// The global property bindings this node was evaluated with.
    pub global_properties: BTreeMap<String, String>,
    /// The evaluated property bag.
    pub properties: BTreeMap<String, String>,
    /// Evaluated item collections keyed by item type.
    pub items: BTreeMap<String, Vec<ProjectItem>>,
}

impl EvaluatedProject {
    /// The evaluated value of property `name`, or `""` when absent.
    ///
    /// Property names compare case-insensitively, matching how build
    /// definitions reference them.
    pub fn property(&self, name: &str) -> &str {
        lookup(&self.properties, name).unwrap_or("")
    }

    /// The evaluated value of property `name`, with blank treated as
    /// absent.
    pub fn property_or_none(&self, name: &str) -> Option<&str> {
        let value = self.property(name).trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Split a `;`-delimited property value into entries.
    pub fn split_property(&self, name: &str) -> Vec<String> {
        strings::split_delimited(self.property(name))
    }

    /// Split a `;`-delimited property value, with blank treated as absent
    /// so callers can fall through a precedence chain.
    pub fn split_property_or_none(&self, name: &str) -> Option<Vec<String>> {
        self.property_or_none(name).map(strings::split_delimited)
    }

    /// Whether property `name` is `true`, falling back to `default`.
    pub fn is_property_true(&self, name: &str, default: bool) -> bool {
        strings::is_true(self.property(name), default)
    }

    /// The global property binding for `name`, if present.
    pub fn global_property(&self, name: &str) -> Option<&str> {
        lookup(&self.global_properties, name)
    }

    /// All items of the given type, in evaluation order.
    pub fn items_of(&self, item_type: &str) -> &[ProjectItem] {
        lookup_entry(&self.items, item_type).map_or(&[], Vec::as_slice)
    }

    /// Items of the given type with duplicate identities removed
    /// (case-insensitive, first occurrence wins).
    pub fn distinct_items_of(&self, item_type: &str) -> Vec<&ProjectItem> {
        let mut seen: Vec<&str> = Vec::new();
        let mut distinct = Vec::new();
        for item in self.items_of(item_type) {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(&item.include)) {
                seen.push(&item.include);
                distinct.push(item);
            }
        }
        distinct
    }
}

fn lookup<'a>(map: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn lookup_entry<'a>(
    map: &'a BTreeMap<String, Vec<ProjectItem>>,
    name: &str,
) -> Option<&'a Vec<ProjectItem>> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}
