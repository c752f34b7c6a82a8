#![forbid(unsafe_code)]
//! The `pakket` binary.
//!
//! `pakket restore` is the host side: it re-invokes this executable with
//! the internal `worker` subcommand, relays the worker's structured
//! output to the console, and maps the worker's exit into a process exit
//! code. The worker side evaluates the project graph, assembles the
//! dependency-graph spec, and runs the restore engine, with all
//! diagnostics flowing through the console logging queue.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use pakket_config::{Settings, SettingsError};
use pakket_engine::{
    assemble, evaluate_graph, expand_entry_points, AssemblyContext, EngineError, EntryPoint,
    GraphOptions, RestoreEngine, RestoreOptions, SpecFileWriter,
};
use pakket_log::{
    relay, CancellationToken, ConsoleLogger, ErrorEvent, EventSource, HostLogger, Importance,
    LogError, LogMessage, Verbosity, WorkerOutcome,
};
use pakket_project::{EngineConfig, ProjectEngine, XmlProjectEngine};
use pakket_util::{paths, strings};

#[derive(Debug, Parser)]
#[command(name = "pakket", version, about = "Project-graph package restore")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Restore packages for the given projects or solutions.
    Restore(RestoreArgs),
    /// Internal: run graph evaluation and restore in this process,
    /// reporting over stdout.
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Debug, Args)]
struct RestoreArgs {
    /// Project or solution files to restore.
    #[arg(required = true)]
    entries: Vec<PathBuf>,

    /// Logging verbosity: quiet, minimal, normal, detailed, diagnostic.
    #[arg(short, long, default_value = "normal")]
    verbosity: Verbosity,

    /// Global property bindings, repeatable.
    #[arg(long = "property", value_name = "NAME=VALUE")]
    properties: Vec<String>,

    /// Explicit settings file, bypassing pakket.toml discovery.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum concurrent restricted builds.
    #[arg(long, value_name = "N")]
    max_parallel: Option<usize>,

    /// Emit a line per evaluated graph node.
    #[arg(long)]
    debug: bool,

    #[arg(long)]
    disable_parallel: bool,
    #[arg(long)]
    force: bool,
    #[arg(long)]
    force_evaluate: bool,
    #[arg(long)]
    hide_warnings_and_errors: bool,
    #[arg(long)]
    ignore_failed_sources: bool,
    #[arg(long)]
    interactive: bool,
    #[arg(long)]
    no_cache: bool,
    #[arg(long)]
    recursive: bool,
}

impl RestoreArgs {
    fn restore_options(&self) -> RestoreOptions {
        RestoreOptions {
            disable_parallel: self.disable_parallel,
            force: self.force,
            force_evaluate: self.force_evaluate,
            hide_warnings_and_errors: self.hide_warnings_and_errors,
            ignore_failed_sources: self.ignore_failed_sources,
            interactive: self.interactive,
            no_cache: self.no_cache,
            recursive: self.recursive,
        }
    }
}

#[derive(Debug, Args)]
struct WorkerArgs {
    #[arg(required = true)]
    entries: Vec<PathBuf>,

    #[arg(long, default_value = "normal")]
    verbosity: Verbosity,

    /// Global property bindings as a `name=value;` string.
    #[arg(long, default_value = "")]
    properties: String,

    /// Restore option flags as a `name=value;` string.
    #[arg(long, default_value = "")]
    options: String,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_parallel: Option<usize>,

    #[arg(long)]
    debug: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Relay(#[from] LogError),

    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(std::io::Error),

    #[error("cannot locate the pakket executable: {0}")]
    Executable(std::io::Error),
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        CliCommand::Restore(args) => run_restore(&args),
        CliCommand::Worker(args) => run_worker_side(&args),
    };
    std::process::exit(code);
}

// ---------------------------------------------------------------- host side

/// Re-emits relayed worker diagnostics on the host's own console.
struct HostConsole;

impl HostConsole {
    fn located(message: &LogMessage) -> String {
        let mut out = String::new();
        if let Some(file) = &message.file {
            out.push_str(file);
            if message.line_number > 0 {
                if message.end_line_number > 0 {
                    out.push_str(&format!(
                        "({},{},{},{})",
                        message.line_number,
                        message.column_number,
                        message.end_line_number,
                        message.end_column_number
                    ));
                } else {
                    out.push_str(&format!(
                        "({},{})",
                        message.line_number, message.column_number
                    ));
                }
            }
            out.push_str(": ");
        }
        if let Some(subcategory) = &message.subcategory {
            out.push_str(subcategory);
            out.push(' ');
        }
        if let Some(code) = &message.code {
            out.push_str(code);
            out.push_str(": ");
        }
        out.push_str(&message.message);
        if let Some(keyword) = &message.help_keyword {
            out.push_str(&format!(" [{keyword}]"));
        }
        out
    }
}

impl HostLogger for HostConsole {
    fn error(&self, message: &LogMessage) {
        eprintln!("error: {}", HostConsole::located(message));
    }

    fn warning(&self, message: &LogMessage) {
        eprintln!("warning: {}", HostConsole::located(message));
    }

    fn message(&self, text: &str, _importance: Importance) {
        // The worker already filtered by verbosity.
        println!("{text}");
    }
}

fn run_restore(args: &RestoreArgs) -> i32 {
    match host_restore(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn host_restore(args: &RestoreArgs) -> Result<i32, CliError> {
    let executable = std::env::current_exe().map_err(CliError::Executable)?;

    let mut command = Command::new(executable);
    command.arg("worker");
    for entry in &args.entries {
        command.arg(entry);
    }
    command
        .arg("--verbosity")
        .arg(args.verbosity.to_string())
        .arg("--options")
        .arg(args.restore_options().to_properties());
    if !args.properties.is_empty() {
        command.arg("--properties").arg(args.properties.join(";"));
    }
    if let Some(config) = &args.config {
        command.arg("--config").arg(config);
    }
    if let Some(max_parallel) = args.max_parallel {
        command.arg("--max-parallel").arg(max_parallel.to_string());
    }
    if args.debug {
        command.arg("--debug");
    }

    let logger: Arc<dyn HostLogger> = Arc::new(HostConsole);
    let cancellation = CancellationToken::new();
    let outcome = relay::run_worker(command, logger, &cancellation)?;

    Ok(match outcome {
        WorkerOutcome::Exited { success: true, .. } => 0,
        WorkerOutcome::Exited { success: false, .. } | WorkerOutcome::Cancelled => 1,
    })
}

// -------------------------------------------------------------- worker side

fn run_worker_side(args: &WorkerArgs) -> i32 {
    let logger = Arc::new(ConsoleLogger::new(args.verbosity));
    let events = Arc::new(EventSource::new());
    logger.initialize(&events);

    let code = match worker_restore(args, &events, &logger) {
        Ok(code) => code,
        Err(error) => {
            logger.log_error(error.to_string());
            1
        }
    };

    logger.shutdown_subscription(&events);
    logger.drain();
    code
}

fn worker_restore(
    args: &WorkerArgs,
    events: &Arc<EventSource>,
    logger: &Arc<ConsoleLogger>,
) -> Result<i32, CliError> {
    let startup_directory = std::env::current_dir().map_err(CliError::WorkingDirectory)?;
    let globals = parse_properties(&args.properties);

    let entry_points: Vec<EntryPoint> = args
        .entries
        .iter()
        .map(|entry| {
            EntryPoint::with_properties(
                paths::absolutize(&startup_directory, entry),
                globals.clone(),
            )
        })
        .collect();
    let expanded = expand_entry_points(&entry_points)?;

    let restore_options = RestoreOptions::from_properties(&args.options);
    let mut graph_options = GraphOptions::default();
    if let Some(max_parallel) = args.max_parallel {
        graph_options.max_parallel = max_parallel.max(1);
    }
    if restore_options.disable_parallel {
        graph_options.max_parallel = 1;
    }
    graph_options.debug = args.debug;

    let engine: Arc<dyn ProjectEngine> = Arc::new(XmlProjectEngine::new(EngineConfig::default()));
    let groups = evaluate_graph(&expanded, &engine, events, &graph_options)?;

    let settings = Settings::load(&startup_directory, args.config.as_deref())?;
    let context = AssemblyContext {
        settings,
        startup_directory,
    };

    let Some(graph) = assemble(&groups, &context, &expanded, events)? else {
        logger.log_message(Importance::High, "Nothing to do. No projects to restore.");
        return Ok(0);
    };
    if graph.restore().is_empty() {
        logger.log_message(Importance::High, "Nothing to do. No projects to restore.");
        return Ok(0);
    }

    let summaries = SpecFileWriter.restore(&graph, &restore_options, events)?;
    let failed = summaries.iter().filter(|summary| !summary.success).count();
    for summary in &summaries {
        if !summary.success {
            events.raise_error(ErrorEvent::text(format!(
                "Restore failed for {}",
                summary.project.display()
            )));
        }
    }

    logger.log_message(
        Importance::High,
        format!("Restored {} project(s), {failed} failed", summaries.len()),
    );
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Parse a `name=value;` string into global property bindings. Pairs
/// without `=` are dropped.
fn parse_properties(value: &str) -> BTreeMap<String, String> {
    strings::split_delimited(value)
        .into_iter()
        .filter_map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn restore_parses_entries_and_flags() {
        let cli = Cli::try_parse_from([
            "pakket",
            "restore",
            "app.sln",
            "--verbosity",
            "detailed",
            "--property",
            "Configuration=Release",
            "--force",
            "--no-cache",
        ])
        .unwrap();

        let CliCommand::Restore(args) = cli.command else {
            panic!("expected restore");
        };
        assert_eq!(args.entries, vec![PathBuf::from("app.sln")]);
        assert_eq!(args.verbosity, Verbosity::Detailed);
        assert_eq!(args.properties, vec!["Configuration=Release".to_owned()]);
        let options = args.restore_options();
        assert!(options.force);
        assert!(options.no_cache);
        assert!(!options.interactive);
    }

    #[test]
    fn restore_requires_an_entry() {
        assert!(Cli::try_parse_from(["pakket", "restore"]).is_err());
    }

    #[test]
    fn bad_verbosity_is_rejected() {
        let result = Cli::try_parse_from(["pakket", "restore", "app.proj", "--verbosity", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn worker_parses_forwarded_arguments() {
        let cli = Cli::try_parse_from([
            "pakket",
            "worker",
            "/work/app.proj",
            "--verbosity",
            "quiet",
            "--properties",
            "Configuration=Release;Platform=x64",
            "--options",
            "Force=true",
            "--max-parallel",
            "2",
        ])
        .unwrap();

        let CliCommand::Worker(args) = cli.command else {
            panic!("expected worker");
        };
        assert_eq!(args.verbosity, Verbosity::Quiet);
        assert_eq!(args.max_parallel, Some(2));
        assert!(RestoreOptions::from_properties(&args.options).force);

        let globals = parse_properties(&args.properties);
        assert_eq!(globals.get("Configuration").unwrap(), "Release");
        assert_eq!(globals.get("Platform").unwrap(), "x64");
    }

    #[test]
    fn parse_properties_drops_malformed_pairs() {
        let globals = parse_properties("A=1;garbage;B = 2 ;");
        assert_eq!(globals.len(), 2);
        assert_eq!(globals.get("A").unwrap(), "1");
        assert_eq!(globals.get("B").unwrap(), "2");
    }

    #[test]
    fn host_console_formats_located_errors() {
        let message = LogMessage {
            message: "boom".to_owned(),
            code: Some("PK1001".to_owned()),
            file: Some("/work/app.proj".to_owned()),
            line_number: 4,
            column_number: 7,
            ..LogMessage::default()
        };
        assert_eq!(
            HostConsole::located(&message),
            "/work/app.proj(4,7): PK1001: boom"
        );
    }

    #[test]
    fn host_console_formats_spans_subcategory_and_keyword() {
        let message = LogMessage {
            message: "boom".to_owned(),
            subcategory: Some("restore".to_owned()),
            code: Some("PK1001".to_owned()),
            help_keyword: Some("PakketErrors".to_owned()),
            file: Some("/work/app.proj".to_owned()),
            line_number: 4,
            column_number: 7,
            end_line_number: 4,
            end_column_number: 21,
            ..LogMessage::default()
        };
        assert_eq!(
            HostConsole::located(&message),
            "/work/app.proj(4,7,4,21): restore PK1001: boom [PakketErrors]"
        );
    }

    #[test]
    fn host_console_formats_bare_errors() {
        let message = LogMessage {
            message: "boom".to_owned(),
            ..LogMessage::default()
        };
        assert_eq!(HostConsole::located(&message), "boom");
    }
}
