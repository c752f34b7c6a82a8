//! Project graph evaluation.
//!
//! Walks the transitive reference graph from a set of entry points,
//! evaluating every distinct (path, global-properties) pair once,
//! expanding multi-targeted projects into framework-pinned inner nodes,
//! and submitting bounded restricted builds for the nodes that need
//! their computed items populated.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use pakket_log::{ErrorEvent, EventSource, Importance, MessageEvent};
use pakket_project::{solution, BuildOutcome, EvaluatedProject, ProjectEngine};
use pakket_util::paths;

use crate::error::EngineError;

/// The only targets ever requested by a restricted build; they exist to
/// populate computed item lists, not to produce build outputs.
pub const RESTRICTED_BUILD_TARGETS: [&str; 3] = [
    "CollectPackageReferences",
    "CollectPackageDownloads",
    "CollectFrameworkReferences",
];

/// One root of the graph: a file path plus caller-supplied global
/// property bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub path: PathBuf,
    pub global_properties: BTreeMap<String, String>,
}

impl EntryPoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EntryPoint {
            path: path.into(),
            global_properties: BTreeMap::new(),
        }
    }

    pub fn with_properties(
        path: impl Into<PathBuf>,
        global_properties: BTreeMap<String, String>,
    ) -> Self {
        EntryPoint {
            path: path.into(),
            global_properties,
        }
    }
}

/// Expand solution entry points into one entry point per member project,
/// each inheriting the solution's global property bindings. Non-solution
/// entry points pass through unchanged.
///
/// # Errors
/// Returns an error if a solution file cannot be read or parsed.
pub fn expand_entry_points(entry_points: &[EntryPoint]) -> Result<Vec<EntryPoint>, EngineError> {
    let mut expanded = Vec::with_capacity(entry_points.len());
    for entry in entry_points {
        if solution::is_solution(&entry.path) {
            for project in solution::expand_solution(&entry.path)? {
                expanded.push(EntryPoint::with_properties(
                    project,
                    entry.global_properties.clone(),
                ));
            }
        } else {
            expanded.push(entry.clone());
        }
    }
    Ok(expanded)
}

/// One project's evaluated nodes: the framework-unpinned outer node plus
/// its framework-pinned inner siblings.
///
/// A project with a single evaluated node is its own sole inner member.
#[derive(Debug, Clone)]
pub struct ProjectGroup {
    pub outer: Arc<EvaluatedProject>,
    pub inner: Vec<Arc<EvaluatedProject>>,
}

/// Knobs fixed by the caller before evaluation starts.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Maximum concurrent restricted builds. `1` forces serial execution;
    /// parallel evaluation destabilizes on single-unit machines.
    pub max_parallel: usize,
    /// Emit a low-importance line per evaluated node.
    pub debug: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            max_parallel: std::thread::available_parallelism()
                .map_or(1, std::num::NonZeroUsize::get),
            debug: false,
        }
    }
}

/// Counts in-flight restricted builds so the walk can wait for all of
/// them before reporting failure state.
#[derive(Default)]
struct BuildLatch {
    pending: Mutex<usize>,
    done: Condvar,
}

impl BuildLatch {
    fn add_one(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending += 1;
        }
    }

    fn finish_one(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = pending.saturating_sub(1);
            if *pending == 0 {
                self.done.notify_all();
            }
        }
    }

    fn wait(&self) {
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        while *pending > 0 {
            match self.done.wait(pending) {
                Ok(guard) => pending = guard,
                Err(_) => return,
            }
        }
    }
}

/// Build the transitive graph from `entry_points` and return one group
/// per project, in first-visited order.
///
/// Each distinct (path, global-properties) pair is evaluated exactly
/// once. A node whose bindings pin a framework, or whose project declares
/// no framework list, gets a restricted build submitted on a bounded
/// worker pool; the walk does not block on individual builds, only on
/// gathering overall failure state before returning.
///
/// # Errors
/// Returns an error if an entry point cannot be expanded, a node fails to
/// evaluate, or any restricted build failed.
pub fn evaluate_graph(
    entry_points: &[EntryPoint],
    engine: &Arc<dyn ProjectEngine>,
    events: &Arc<EventSource>,
    options: &GraphOptions,
) -> Result<Vec<ProjectGroup>, EngineError> {
    let started = Instant::now();
    events.raise_message(MessageEvent::new(
        Importance::High,
        "Determining projects to restore...",
    ));

    let expanded = expand_entry_points(entry_points)?;

    let pool = if options.max_parallel > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_parallel)
            .build()
            .map_err(|e| EngineError::WorkerPool {
                message: e.to_string(),
            })?;
        Some(pool)
    } else {
        None
    };

    let latch = Arc::new(BuildLatch::default());
    let failures = Arc::new(AtomicUsize::new(0));
    let mut builds = 0usize;

    let mut worklist: VecDeque<(PathBuf, BTreeMap<String, String>)> = expanded
        .iter()
        .map(|entry| (entry.path.clone(), entry.global_properties.clone()))
        .collect();
    let mut visited: HashSet<(PathBuf, Vec<(String, String)>)> = HashSet::new();
    let mut order: Vec<PathBuf> = Vec::new();
    let mut nodes_by_path: HashMap<PathBuf, Vec<Arc<EvaluatedProject>>> = HashMap::new();

    while let Some((path, globals)) = worklist.pop_front() {
        let key = (
            path.clone(),
            globals
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        if !visited.insert(key) {
            continue;
        }

        let node = match engine.evaluate(&path, &globals) {
            Ok(node) => Arc::new(node),
            Err(error) => {
                events.raise_error(ErrorEvent {
                    message: error.to_string(),
                    project_file: Some(path.display().to_string()),
                    ..ErrorEvent::default()
                });
                return Err(error.into());
            }
        };

        if options.debug {
            events.raise_message(MessageEvent::new(
                Importance::Low,
                format!("Evaluated {} with {:?}", path.display(), globals),
            ));
        }

        let pinned = node.global_property("TargetFramework").is_some();
        let frameworks = node.split_property("TargetFrameworks");

        if pinned || frameworks.is_empty() {
            builds += 1;
            submit_build(pool.as_ref(), engine, &node, &latch, &failures, events);
        }

        // The outer node fans out one framework-pinned sibling per
        // declared framework.
        if !pinned {
            for framework in &frameworks {
                let mut inner_globals = globals.clone();
                inner_globals.insert("TargetFramework".to_owned(), framework.clone());
                worklist.push_back((path.clone(), inner_globals));
            }
        }

        for reference in node.items_of("ProjectReference") {
            if !reference.is_metadata_true("ReferenceOutputAssembly", true) {
                continue;
            }
            let relative = reference.include.replace('\\', "/");
            let referenced = paths::absolutize(&node.directory, Path::new(&relative));
            // A referenced project picks its own frameworks; the pin does
            // not propagate across project boundaries.
            let mut referenced_globals = globals.clone();
            referenced_globals.retain(|name, _| !name.eq_ignore_ascii_case("TargetFramework"));
            worklist.push_back((referenced, referenced_globals));
        }

        if !nodes_by_path.contains_key(&path) {
            order.push(path.clone());
        }
        nodes_by_path.entry(path).or_default().push(node);
    }

    latch.wait();
    let failed = failures.load(Ordering::SeqCst);

    events.raise_message(MessageEvent::new(
        Importance::Normal,
        format!(
            "Evaluated {} project(s) in {}ms ({builds} restricted builds, {failed} failed)",
            order.len(),
            started.elapsed().as_millis(),
        ),
    ));

    if failed > 0 {
        return Err(EngineError::RestrictedBuildsFailed { count: failed });
    }

    Ok(order
        .into_iter()
        .filter_map(|path| group_nodes(nodes_by_path.remove(&path).unwrap_or_default()))
        .collect())
}

fn submit_build(
    pool: Option<&rayon::ThreadPool>,
    engine: &Arc<dyn ProjectEngine>,
    node: &Arc<EvaluatedProject>,
    latch: &Arc<BuildLatch>,
    failures: &Arc<AtomicUsize>,
    events: &Arc<EventSource>,
) {
    latch.add_one();

    let engine = Arc::clone(engine);
    let node = Arc::clone(node);
    let latch = Arc::clone(latch);
    let failures = Arc::clone(failures);
    let events = Arc::clone(events);

    let run = move || {
        match engine.run_targets(&node, &RESTRICTED_BUILD_TARGETS) {
            Ok(BuildOutcome::Succeeded) => {}
            Ok(BuildOutcome::Failed) => {
                failures.fetch_add(1, Ordering::SeqCst);
                events.raise_error(ErrorEvent {
                    message: "restricted build failed".to_owned(),
                    project_file: Some(node.path.display().to_string()),
                    ..ErrorEvent::default()
                });
            }
            Err(error) => {
                failures.fetch_add(1, Ordering::SeqCst);
                events.raise_error(ErrorEvent {
                    message: error.to_string(),
                    project_file: Some(node.path.display().to_string()),
                    ..ErrorEvent::default()
                });
            }
        }
        latch.finish_one();
    };

    match pool {
        Some(pool) => pool.spawn(run),
        None => run(),
    }
}

/// Reduce one path's evaluated nodes to an outer/inner group.
///
/// The outer node is the one evaluated without a framework pin; when
/// every node is pinned (the caller pinned a framework at the entry
/// point) the first node stands in as outer. The inner set is the pinned
/// nodes, or the outer itself when nothing was pinned.
fn group_nodes(nodes: Vec<Arc<EvaluatedProject>>) -> Option<ProjectGroup> {
    let outer = nodes
        .iter()
        .find(|node| node.global_property("TargetFramework").is_none())
        .or_else(|| nodes.first())?
        .clone();

    let pinned: Vec<Arc<EvaluatedProject>> = nodes
        .iter()
        .filter(|node| node.global_property("TargetFramework").is_some())
        .cloned()
        .collect();

    let inner = if pinned.is_empty() {
        vec![Arc::clone(&outer)]
    } else {
        pinned
    };

    Some(ProjectGroup { outer, inner })
}
