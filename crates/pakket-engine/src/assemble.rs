//! Dependency-graph spec assembly: derive one normalized package spec
//! per evaluated group and gather them into the frozen aggregate.
//!
//! Derivation runs in parallel across groups; each worker only reads its
//! own group and the shared immutable settings, so the single aggregate
//! lock is held just for the duration of one insertion.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::prelude::*;

use pakket_config::Settings;
use pakket_log::{EventSource, Importance, MessageEvent};
use pakket_project::EvaluatedProject;
use pakket_util::{paths, strings, Version, VersionRange};

use crate::error::EngineError;
use crate::graph::{EntryPoint, ProjectGroup};
use crate::spec::{
    DownloadDependency, FrameworkDependency, GraphSpec, LockProperties, PackageDependency,
    PackageSpec, ProjectReference, ProjectStyle, RestoreMetadata, RuntimeGraph,
    TargetFrameworkInfo, WarningProperties,
};

/// Shared, immutable inputs to spec derivation.
#[derive(Debug, Clone)]
pub struct AssemblyContext {
    /// Ambient restore settings, the last link of every precedence chain.
    pub settings: Settings,
    /// The directory the run was started from; relative entry-point
    /// paths resolve against it.
    pub startup_directory: PathBuf,
}

/// Derive a package spec for every group and return the frozen
/// aggregate, or `None` when there were no groups at all ("nothing to
/// restore", not an error).
///
/// `entry_points` must already be solution-expanded; each entry whose
/// project restores by package reference lands on the direct-restore
/// list.
///
/// # Errors
/// Returns an error if any group carries an invalid reference, such as a
/// package download without an exact pinned version.
pub fn assemble(
    groups: &[ProjectGroup],
    context: &AssemblyContext,
    entry_points: &[EntryPoint],
    events: &EventSource,
) -> Result<Option<GraphSpec>, EngineError> {
    if groups.is_empty() {
        return Ok(None);
    }

    let aggregate = Mutex::new(GraphSpec::new());

    groups.par_iter().try_for_each(|group| {
        let spec = derive_spec(group, context)?;
        if let Ok(mut aggregate) = aggregate.lock() {
            aggregate.add_project(spec);
        }
        Ok::<(), EngineError>(())
    })?;

    let mut aggregate = aggregate
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    for entry in entry_points {
        let path = paths::absolutize(&context.startup_directory, &entry.path);
        let restorable = aggregate
            .project(&path)
            .is_some_and(|spec| spec.restore_metadata.style == ProjectStyle::PackageReference);
        if restorable {
            aggregate.add_restore(path);
        }
    }

    events.raise_message(MessageEvent::new(
        Importance::Normal,
        format!(
            "Assembled dependency graph spec for {} project(s), {} restorable",
            aggregate.len(),
            aggregate.restore().len(),
        ),
    ));

    Ok(Some(aggregate))
}

fn derive_spec(
    group: &ProjectGroup,
    context: &AssemblyContext,
) -> Result<PackageSpec, EngineError> {
    let outer = &group.outer;
    let directory = outer.directory.as_path();

    let name = outer
        .property_or_none("PackageId")
        .or_else(|| outer.property_or_none("AssemblyName"))
        .or_else(|| outer.property_or_none("ProjectName"))
        .map(ToOwned::to_owned)
        .or_else(|| {
            outer
                .path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| "project".to_owned());

    let version = match outer
        .property_or_none("PackageVersion")
        .or_else(|| outer.property_or_none("Version"))
    {
        Some(value) => Version::parse(value)?,
        None => Version::new(1, 0, 0),
    };

    let original_target_frameworks = outer.split_property("TargetFrameworks");

    let target_frameworks = group
        .inner
        .iter()
        .map(|inner| derive_framework(inner, outer))
        .collect::<Result<Vec<_>, _>>()?;

    let output_path = outer
        .property_or_none("RestoreOutputPath")
        .and_then(|value| paths::absolutize_value(directory, value))
        .unwrap_or_else(|| directory.join("obj"));

    let packages_path = outer
        .property_or_none("RestorePackagesPath")
        .and_then(|value| paths::absolutize_value(directory, value))
        .unwrap_or_else(|| context.settings.packages_path.clone());

    let sources = resolve_list(
        group,
        context,
        "RestoreSourcesOverride",
        "RestoreSources",
        "RestoreAdditionalProjectSources",
        "RestoreAdditionalProjectSourcesExcludes",
        &context.settings.sources,
    );

    let fallback_folders = resolve_list(
        group,
        context,
        "RestoreFallbackFoldersOverride",
        "RestoreFallbackFolders",
        "RestoreAdditionalProjectFallbackFolders",
        "RestoreAdditionalProjectFallbackFoldersExcludes",
        &context.settings.fallback_folders,
    );

    let style = classify_style(group);

    let warning_properties = WarningProperties {
        treat_warnings_as_errors: outer.is_property_true("TreatWarningsAsErrors", false),
        warnings_as_errors: outer.split_property("WarningsAsErrors"),
        no_warn: outer.split_property("NoWarn"),
    };

    let lock_properties = LockProperties {
        restore_packages_with_lock_file: outer
            .property_or_none("RestorePackagesWithLockFile")
            .map(ToOwned::to_owned),
        lock_file_path: outer
            .property_or_none("LockFilePath")
            .and_then(|value| paths::absolutize_value(directory, value)),
        restore_locked_mode: outer.is_property_true("RestoreLockedMode", false),
    };

    let runtime_graph = derive_runtime_graph(group);

    // Content files only make sense when the project declares its
    // framework shape.
    let skip_content_file_write = outer.property_or_none("TargetFramework").is_none()
        && original_target_frameworks.is_empty();

    Ok(PackageSpec {
        name,
        file_path: outer.path.clone(),
        version,
        target_frameworks,
        restore_metadata: RestoreMetadata {
            output_path,
            packages_path,
            sources,
            fallback_folders,
            config_paths: context.settings.config_paths.clone(),
            style,
            cross_targeting: !original_target_frameworks.is_empty(),
            original_target_frameworks,
            skip_content_file_write,
            warning_properties,
            lock_properties,
        },
        runtime_graph,
    })
}

fn derive_framework(
    inner: &EvaluatedProject,
    outer: &EvaluatedProject,
) -> Result<TargetFrameworkInfo, EngineError> {
    let framework = inner
        .global_property("TargetFramework")
        .or_else(|| inner.property_or_none("TargetFramework"))
        .unwrap_or("")
        .to_owned();

    let dependencies = inner
        .distinct_items_of("PackageReference")
        .into_iter()
        .map(|item| {
            Ok(PackageDependency {
                id: item.include.clone(),
                version_range: VersionRange::parse(item.metadata_value("Version"))?,
                auto_referenced: item.is_metadata_true("IsImplicitlyDefined", false),
                include_assets: strings::split_delimited(item.metadata_value("IncludeAssets")),
                exclude_assets: strings::split_delimited(item.metadata_value("ExcludeAssets")),
                private_assets: strings::split_delimited(item.metadata_value("PrivateAssets")),
                no_warn: strings::split_delimited(item.metadata_value("NoWarn")),
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let mut download_dependencies = Vec::new();
    for item in inner.distinct_items_of("PackageDownload") {
        let versions = strings::split_delimited(item.metadata_value("Version"));
        if versions.is_empty() {
            return Err(EngineError::InexactDownloadVersion {
                project: outer.path.display().to_string(),
                id: item.include.clone(),
                range: String::new(),
            });
        }
        for version in versions {
            let range = VersionRange::parse(&version)?;
            if !range.is_exact() {
                return Err(EngineError::InexactDownloadVersion {
                    project: outer.path.display().to_string(),
                    id: item.include.clone(),
                    range: version,
                });
            }
            download_dependencies.push(DownloadDependency {
                id: item.include.clone(),
                version_range: range,
            });
        }
    }

    let framework_references = inner
        .distinct_items_of("FrameworkReference")
        .into_iter()
        .map(|item| FrameworkDependency {
            name: item.include.clone(),
            private_assets: strings::split_delimited(item.metadata_value("PrivateAssets")),
        })
        .collect();

    let project_references = inner
        .items_of("ProjectReference")
        .iter()
        .filter(|item| item.is_metadata_true("ReferenceOutputAssembly", true))
        .map(|item| {
            let relative = item.include.replace('\\', "/");
            ProjectReference {
                path: paths::absolutize(&inner.directory, Path::new(&relative)),
            }
        })
        .collect();

    let runtime_identifier_graph_path = inner
        .property_or_none("RuntimeIdentifierGraphPath")
        .and_then(|value| paths::absolutize_value(&inner.directory, value));

    Ok(TargetFrameworkInfo {
        framework,
        dependencies,
        download_dependencies,
        framework_references,
        project_references,
        runtime_identifier_graph_path,
    })
}

/// Override wins outright and resolves against the startup directory,
/// since it arrives from the command line rather than the project. An
/// explicit list is used next, with the clear keyword producing an empty
/// list instead of falling through; otherwise the ambient default
/// applies. Additional values, minus the excludes list, are gathered
/// across the inner nodes (where the per-framework properties are bound)
/// and appended to whichever base was chosen.
fn resolve_list(
    group: &ProjectGroup,
    context: &AssemblyContext,
    override_property: &str,
    explicit_property: &str,
    additional_property: &str,
    excludes_property: &str,
    defaults: &[String],
) -> Vec<String> {
    let outer = &group.outer;

    if let Some(values) = outer.split_property_or_none(override_property) {
        return resolve_entries(&context.startup_directory, values);
    }

    let base = if let Some(values) = outer.split_property_or_none(explicit_property) {
        if strings::contains_clear_keyword(&values) {
            Vec::new()
        } else {
            values
        }
    } else {
        defaults.to_vec()
    };
    let mut resolved = resolve_entries(&outer.directory, base);

    let additional: Vec<String> = group
        .inner
        .iter()
        .flat_map(|inner| inner.split_property(additional_property))
        .collect();
    let excludes: Vec<String> = group
        .inner
        .iter()
        .flat_map(|inner| inner.split_property(excludes_property))
        .collect();
    resolved.extend(resolve_entries(
        &outer.directory,
        strings::aggregate_values(&additional, &excludes),
    ));
    resolved
}

/// Folder-like entries resolve against the project directory; URLs pass
/// through untouched.
fn resolve_entries(directory: &Path, values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| {
            if value.contains("://") {
                value
            } else {
                paths::absolutize(directory, Path::new(&value))
                    .display()
                    .to_string()
            }
        })
        .collect()
}

fn classify_style(group: &ProjectGroup) -> ProjectStyle {
    if let Some(style) = group
        .outer
        .property_or_none("RestoreProjectStyle")
        .and_then(|value| value.parse::<ProjectStyle>().ok())
    {
        return style;
    }

    let has_package_references = group
        .inner
        .iter()
        .any(|inner| !inner.items_of("PackageReference").is_empty());
    if has_package_references {
        return ProjectStyle::PackageReference;
    }

    if group.outer.directory.join("packages.config").is_file() {
        return ProjectStyle::PackagesConfig;
    }

    ProjectStyle::Unknown
}

fn derive_runtime_graph(group: &ProjectGroup) -> Option<RuntimeGraph> {
    let mut runtimes = Vec::new();
    let mut supports = Vec::new();

    let nodes = std::iter::once(&group.outer).chain(group.inner.iter());
    for node in nodes {
        runtimes.extend(node.split_property("RuntimeIdentifiers"));
        if let Some(runtime) = node.property_or_none("RuntimeIdentifier") {
            runtimes.push(runtime.to_owned());
        }
        supports.extend(node.split_property("RuntimeSupports"));
    }

    let graph = RuntimeGraph {
        runtimes: strings::aggregate_values(&runtimes, &[]),
        supports: strings::aggregate_values(&supports, &[]),
    };
    if graph.is_empty() {
        None
    } else {
        Some(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use pakket_project::{ProjectEngine, XmlProjectEngine};

    use crate::graph::{evaluate_graph, expand_entry_points, GraphOptions};

    use super::*;

    fn settings() -> Settings {
        Settings {
            sources: vec!["https://default/index.json".to_owned()],
            fallback_folders: Vec::new(),
            packages_path: PathBuf::from("/home/dev/.pakket/packages"),
            config_paths: Vec::new(),
        }
    }

    fn context() -> AssemblyContext {
        AssemblyContext {
            settings: settings(),
            startup_directory: PathBuf::from("/"),
        }
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn groups_for(entry: &Path) -> (Vec<ProjectGroup>, Vec<EntryPoint>) {
        let engine: Arc<dyn ProjectEngine> = Arc::new(XmlProjectEngine::default());
        let entry_points = vec![EntryPoint::new(entry)];
        let groups = evaluate_graph(
            &entry_points,
            &engine,
            &Arc::new(EventSource::new()),
            &GraphOptions {
                max_parallel: 1,
                debug: false,
            },
        )
        .unwrap();
        let expanded = expand_entry_points(&entry_points).unwrap();
        (groups, expanded)
    }

    fn assemble_for(entry: &Path) -> Result<Option<GraphSpec>, EngineError> {
        let (groups, expanded) = groups_for(entry);
        assemble(&groups, &context(), &expanded, &EventSource::new())
    }

    #[test]
    fn no_groups_is_nothing_to_restore() {
        let result = assemble(&[], &context(), &[], &EventSource::new()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn solution_with_two_frameworks_and_pinned_package() {
        let tmp = tempfile::tempdir().unwrap();
        let project = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup><TargetFrameworks>net8.0;net9.0</TargetFrameworks></PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Foo" Version="[2.0.0]" />
              </ItemGroup>
            </Project>"#,
        );
        let sln = write_file(
            tmp.path(),
            "all.sln",
            "Project(\"{G}\") = \"app\", \"app.proj\", \"{G}\"\n",
        );

        let graph = assemble_for(&sln).unwrap().unwrap();
        assert_eq!(graph.len(), 1);

        let spec = graph.project(&project).unwrap();
        assert_eq!(spec.target_frameworks.len(), 2);
        let frameworks: Vec<&str> = spec
            .target_frameworks
            .iter()
            .map(|tf| tf.framework.as_str())
            .collect();
        assert_eq!(frameworks, vec!["net8.0", "net9.0"]);
        for tf in &spec.target_frameworks {
            let dependency = tf.dependencies.first().unwrap();
            assert_eq!(dependency.id, "Foo");
            assert!(dependency.version_range.is_exact());
            assert_eq!(dependency.version_range.original(), "[2.0.0]");
        }
        assert!(spec.restore_metadata.cross_targeting);
        assert_eq!(
            spec.restore_metadata.original_target_frameworks,
            vec!["net8.0".to_owned(), "net9.0".to_owned()]
        );
        // The expanded entry point restores directly.
        assert_eq!(graph.restore(), &[project]);
    }

    #[test]
    fn download_requires_exact_version() {
        let tmp = tempfile::tempdir().unwrap();
        let inexact = write_file(
            tmp.path(),
            "bad.proj",
            r#"<Project>
              <ItemGroup><PackageDownload Include="Foo" Version="1.2.3" /></ItemGroup>
            </Project>"#,
        );
        let result = assemble_for(&inexact);
        assert!(matches!(
            result,
            Err(EngineError::InexactDownloadVersion { .. })
        ));

        let exact = write_file(
            tmp.path(),
            "good.proj",
            r#"<Project>
              <ItemGroup><PackageDownload Include="Foo" Version="[1.2.3]" /></ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&exact).unwrap().unwrap();
        let spec = graph.project(&exact).unwrap();
        let downloads = &spec.target_frameworks.first().unwrap().download_dependencies;
        assert_eq!(downloads.len(), 1);
        assert!(downloads.first().unwrap().version_range.is_exact());
    }

    #[test]
    fn download_version_list_expands_to_one_entry_each() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <ItemGroup><PackageDownload Include="Foo" Version="[1.0.0];[2.0.0]" /></ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        let downloads = &spec.target_frameworks.first().unwrap().download_dependencies;
        assert_eq!(downloads.len(), 2);
    }

    #[test]
    fn explicit_clear_empties_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup><RestoreSources>clear</RestoreSources></PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        assert!(spec.restore_metadata.sources.is_empty());
    }

    #[test]
    fn default_sources_plus_additional_minus_excludes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup>
                <RestoreAdditionalProjectSources>https://extra;https://dropped</RestoreAdditionalProjectSources>
                <RestoreAdditionalProjectSourcesExcludes>https://dropped</RestoreAdditionalProjectSourcesExcludes>
              </PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        assert_eq!(
            spec.restore_metadata.sources,
            vec![
                "https://default/index.json".to_owned(),
                "https://extra".to_owned(),
            ]
        );
    }

    #[test]
    fn additional_sources_gather_across_frameworks() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup>
                <TargetFrameworks>net8.0;net9.0</TargetFrameworks>
                <RestoreAdditionalProjectSources>feeds/$(TargetFramework)</RestoreAdditionalProjectSources>
              </PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        // The property expands per framework node, so both expansions
        // land on the list.
        assert_eq!(
            spec.restore_metadata.sources,
            vec![
                "https://default/index.json".to_owned(),
                tmp.path().join("feeds/net8.0").display().to_string(),
                tmp.path().join("feeds/net9.0").display().to_string(),
            ]
        );
    }

    #[test]
    fn override_sources_resolve_against_startup_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup><RestoreSourcesOverride>feeds</RestoreSourcesOverride></PropertyGroup>
            </Project>"#,
        );
        let (groups, expanded) = groups_for(&path);
        let context = AssemblyContext {
            settings: settings(),
            startup_directory: PathBuf::from("/work/start"),
        };
        let graph = assemble(&groups, &context, &expanded, &EventSource::new())
            .unwrap()
            .unwrap();
        let spec = graph.project(&path).unwrap();
        assert_eq!(
            spec.restore_metadata.sources,
            vec!["/work/start/feeds".to_owned()]
        );
    }

    #[test]
    fn override_sources_win_outright() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup>
                <RestoreSources>https://explicit</RestoreSources>
                <RestoreSourcesOverride>https://override</RestoreSourcesOverride>
              </PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        assert_eq!(
            spec.restore_metadata.sources,
            vec!["https://override".to_owned()]
        );
    }

    #[test]
    fn folder_sources_resolve_against_project_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup><RestoreSources>../local-feed</RestoreSources></PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        let expected = paths::absolutize(tmp.path(), Path::new("../local-feed"));
        assert_eq!(
            spec.restore_metadata.sources,
            vec![expected.display().to_string()]
        );
    }

    #[test]
    fn style_explicit_beats_inference() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup><RestoreProjectStyle>PackagesConfig</RestoreProjectStyle></PropertyGroup>
              <ItemGroup><PackageReference Include="Foo" Version="1.0.0" /></ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        assert_eq!(spec.restore_metadata.style, ProjectStyle::PackagesConfig);
    }

    #[test]
    fn style_inferred_from_packages_config_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("packages.config"), "<packages />").unwrap();
        let path = write_file(tmp.path(), "app.proj", "<Project />");
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        assert_eq!(spec.restore_metadata.style, ProjectStyle::PackagesConfig);
    }

    #[test]
    fn style_unknown_keeps_project_off_restore_list() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(tmp.path(), "app.proj", "<Project />");
        let graph = assemble_for(&path).unwrap().unwrap();
        assert_eq!(
            graph.project(&path).unwrap().restore_metadata.style,
            ProjectStyle::Unknown
        );
        assert!(graph.restore().is_empty());
    }

    #[test]
    fn version_precedence_and_default() {
        let tmp = tempfile::tempdir().unwrap();
        let explicit = write_file(
            tmp.path(),
            "versioned.proj",
            r#"<Project>
              <PropertyGroup>
                <Version>2.0.0</Version>
                <PackageVersion>3.1.4</PackageVersion>
              </PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&explicit).unwrap().unwrap();
        assert_eq!(
            graph.project(&explicit).unwrap().version,
            Version::new(3, 1, 4)
        );

        let bare = write_file(tmp.path(), "bare.proj", "<Project />");
        let graph = assemble_for(&bare).unwrap().unwrap();
        assert_eq!(graph.project(&bare).unwrap().version, Version::new(1, 0, 0));
    }

    #[test]
    fn warning_lock_and_runtime_properties_carry_over() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <PropertyGroup>
                <TreatWarningsAsErrors>true</TreatWarningsAsErrors>
                <NoWarn>PK1001;PK1002</NoWarn>
                <RestorePackagesWithLockFile>true</RestorePackagesWithLockFile>
                <RestoreLockedMode>true</RestoreLockedMode>
                <RuntimeIdentifiers>linux-x64;win-x64</RuntimeIdentifiers>
              </PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();

        let warnings = &spec.restore_metadata.warning_properties;
        assert!(warnings.treat_warnings_as_errors);
        assert_eq!(warnings.no_warn, vec!["PK1001".to_owned(), "PK1002".to_owned()]);

        let lock = &spec.restore_metadata.lock_properties;
        assert_eq!(lock.restore_packages_with_lock_file.as_deref(), Some("true"));
        assert!(lock.restore_locked_mode);

        let runtime = spec.runtime_graph.as_ref().unwrap();
        assert_eq!(
            runtime.runtimes,
            vec!["linux-x64".to_owned(), "win-x64".to_owned()]
        );
    }

    #[test]
    fn package_reference_metadata_is_extracted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <ItemGroup>
                <PackageReference Include="Foo" Version="1.0.0"
                  PrivateAssets="all" IncludeAssets="compile;runtime"
                  NoWarn="PK2001" IsImplicitlyDefined="true" />
              </ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        let dependency = spec
            .target_frameworks
            .first()
            .unwrap()
            .dependencies
            .first()
            .unwrap();
        assert!(dependency.auto_referenced);
        assert_eq!(dependency.private_assets, vec!["all".to_owned()]);
        assert_eq!(
            dependency.include_assets,
            vec!["compile".to_owned(), "runtime".to_owned()]
        );
        assert_eq!(dependency.no_warn, vec!["PK2001".to_owned()]);
    }

    #[test]
    fn unversioned_package_reference_gets_unbounded_range() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <ItemGroup><PackageReference Include="Foo" /></ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&path).unwrap().unwrap();
        let spec = graph.project(&path).unwrap();
        let dependency = spec
            .target_frameworks
            .first()
            .unwrap()
            .dependencies
            .first()
            .unwrap();
        assert_eq!(dependency.version_range, VersionRange::all());
    }

    #[test]
    fn skip_content_file_write_only_without_frameworks() {
        let tmp = tempfile::tempdir().unwrap();
        let bare = write_file(tmp.path(), "bare.proj", "<Project />");
        let graph = assemble_for(&bare).unwrap().unwrap();
        assert!(
            graph
                .project(&bare)
                .unwrap()
                .restore_metadata
                .skip_content_file_write
        );

        let framed = write_file(
            tmp.path(),
            "framed.proj",
            r#"<Project>
              <PropertyGroup><TargetFramework>net9.0</TargetFramework></PropertyGroup>
            </Project>"#,
        );
        let graph = assemble_for(&framed).unwrap().unwrap();
        assert!(
            !graph
                .project(&framed)
                .unwrap()
                .restore_metadata
                .skip_content_file_write
        );
    }

    #[test]
    fn project_references_land_in_descriptors() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "lib.proj",
            r#"<Project>
              <ItemGroup><PackageReference Include="Dep" Version="1.0.0" /></ItemGroup>
            </Project>"#,
        );
        let app = write_file(
            tmp.path(),
            "app.proj",
            r#"<Project>
              <ItemGroup><ProjectReference Include="lib.proj" /></ItemGroup>
            </Project>"#,
        );
        let graph = assemble_for(&app).unwrap().unwrap();
        assert_eq!(graph.len(), 2);
        let spec = graph.project(&app).unwrap();
        let references = &spec.target_frameworks.first().unwrap().project_references;
        assert_eq!(
            references,
            &vec![ProjectReference {
                path: tmp.path().join("lib.proj"),
            }]
        );
    }
}
