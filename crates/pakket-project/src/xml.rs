//! Reference implementation of [`ProjectEngine`] over XML build
//! definitions.
//!
//! Supports the subset of the format the restore pipeline needs:
//! `<PropertyGroup>` elements evaluated in document order (properties
//! first, items second), `<ItemGroup>` items with metadata from attributes
//! and child elements, and `$(Name)` expansion with global properties
//! overriding project-defined ones. `<Import>` and `Condition` attributes
//! are not evaluated; a full engine plugs in at the same trait seam.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::engine::{BuildOutcome, EngineConfig, ProjectEngine};
use crate::error::ProjectError;
use crate::model::{EvaluatedProject, ProjectItem};

/// Attributes that are structural rather than item metadata.
const RESERVED_ITEM_ATTRIBUTES: [&str; 4] = ["Include", "Condition", "Update", "Exclude"];

/// An XML-backed build-definition evaluator.
#[derive(Debug, Default)]
pub struct XmlProjectEngine {
    config: EngineConfig,
}

impl XmlProjectEngine {
    pub fn new(config: EngineConfig) -> Self {
        XmlProjectEngine { config }
    }

    /// The engine configuration this instance was fixed with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl ProjectEngine for XmlProjectEngine {
    fn evaluate(
        &self,
        path: &Path,
        global_properties: &BTreeMap<String, String>,
    ) -> Result<EvaluatedProject, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let doc = roxmltree::Document::parse(&content).map_err(|e| ProjectError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(ProjectError::InvalidProject {
                path: path.display().to_string(),
                reason: format!("root element is <{}>, expected <Project>", root.tag_name().name()),
            });
        }

        let directory = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let mut properties: BTreeMap<String, String> = BTreeMap::new();
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            properties.insert("ProjectName".to_owned(), stem.to_owned());
        }

        // Pass 1: properties, in document order. Later definitions win,
        // except that global bindings are immutable.
        for group in elements_named(&root, "PropertyGroup") {
            for prop in child_elements(&group) {
                let name = prop.tag_name().name();
                if lookup(global_properties, name).is_some() {
                    continue;
                }
                let value = expand(
                    prop.text().unwrap_or(""),
                    global_properties,
                    &properties,
                );
                set(&mut properties, name, value);
            }
        }

        // Global bindings appear in the evaluated bag like any property.
        for (name, value) in global_properties {
            set(&mut properties, name, value.clone());
        }

        // Pass 2: items.
        let mut items: BTreeMap<String, Vec<ProjectItem>> = BTreeMap::new();
        for group in elements_named(&root, "ItemGroup") {
            for element in child_elements(&group) {
                let include = expand(
                    element.attribute("Include").unwrap_or(""),
                    global_properties,
                    &properties,
                );
                if include.trim().is_empty() {
                    continue;
                }

                let mut metadata = BTreeMap::new();
                for attribute in element.attributes() {
                    let name = attribute.name();
                    if RESERVED_ITEM_ATTRIBUTES.iter().any(|r| *r == name) {
                        continue;
                    }
                    metadata.insert(
                        name.to_owned(),
                        expand(attribute.value(), global_properties, &properties),
                    );
                }
                for child in child_elements(&element) {
                    metadata.insert(
                        child.tag_name().name().to_owned(),
                        expand(child.text().unwrap_or(""), global_properties, &properties),
                    );
                }

                let item = ProjectItem {
                    include: include.trim().to_owned(),
                    metadata,
                };
                push_item(&mut items, element.tag_name().name(), item);
            }
        }

        Ok(EvaluatedProject {
            path: path.to_path_buf(),
            directory,
            global_properties: global_properties.clone(),
            properties,
            items,
        })
    }

    fn run_targets(
        &self,
        _project: &EvaluatedProject,
        _targets: &[&str],
    ) -> Result<BuildOutcome, ProjectError> {
        // Reference items are declared statically, so the collect targets
        // are satisfied at evaluation time; nonexistent targets are
        // skipped by contract.
        Ok(BuildOutcome::Succeeded)
    }
}

fn elements_named<'a, 'input>(
    root: &roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    root.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_elements<'a, 'input>(
    node: &roxmltree::Node<'a, 'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children().filter(roxmltree::Node::is_element)
}

fn lookup<'a>(map: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn set(map: &mut BTreeMap<String, String>, name: &str, value: String) {
    let existing = map
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .cloned();
    match existing {
        Some(key) => {
            map.insert(key, value);
        }
        None => {
            map.insert(name.to_owned(), value);
        }
    }
}

fn push_item(items: &mut BTreeMap<String, Vec<ProjectItem>>, item_type: &str, item: ProjectItem) {
    let existing = items
        .keys()
        .find(|key| key.eq_ignore_ascii_case(item_type))
        .cloned();
    let key = existing.unwrap_or_else(|| item_type.to_owned());
    items.entry(key).or_default().push(item);
}

/// Expand `$(Name)` references against global bindings (which win) and
/// previously evaluated properties. Unknown names expand to the empty
/// string; an unterminated `$(` is kept literally.
fn expand(
    value: &str,
    global_properties: &BTreeMap<String, String>,
    properties: &BTreeMap<String, String>,
) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("$(") {
        out.push_str(rest.get(..start).unwrap_or(""));
        let after = rest.get(start + 2..).unwrap_or("");
        match after.find(')') {
            Some(end) => {
                let name = after.get(..end).unwrap_or("");
                if let Some(resolved) =
                    lookup(global_properties, name).or_else(|| lookup(properties, name))
                {
                    out.push_str(resolved);
                }
                rest = after.get(end + 1..).unwrap_or("");
            }
            None => {
                out.push_str(rest.get(start..).unwrap_or(""));
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
