//! Weave CLI, the command-line interface for the Weave augmentation engine.
//!
//! Provides `weave build` to bring every augmentation artifact up to date,
//! `weave status` to list computed metadata, `weave graph` to print the
//! dependency registry, and `weave metadata` to inspect a single item.

#![warn(missing_docs)]

mod build;
mod declarations;
mod graph;
mod inspect;
mod pipeline;
mod providers;
mod status;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Weave: incremental, dependency-aware source augmentation.
#[derive(Parser, Debug)]
#[command(name = "weave", version, about = "Weave augmentation engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `weave.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute every provider's metadata and write changed artifacts.
    Build,
    /// Build, then list every cached metadata item.
    Status,
    /// Build, then print the dependency registry.
    Graph(GraphArgs),
    /// Build, then print one metadata item.
    Metadata(MetadataArgs),
}

/// Arguments for the `weave graph` subcommand.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Output format for the graph.
    #[arg(short, long, value_enum, default_value_t = GraphFormat::Text)]
    pub format: GraphFormat,
}

/// Arguments for the `weave metadata` subcommand.
#[derive(Parser, Debug)]
pub struct MetadataArgs {
    /// Instance-level metadata identifier, e.g. `MID:bean#src?com.example.Widget`.
    pub mid: String,

    /// Output format for the item.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Graph output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// One edge per line.
    Text,
    /// Graphviz DOT.
    Dot,
}

/// Item output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Build => build::run(&global),
        Command::Status => status::run(&global),
        Command::Graph(ref args) => graph::run(args, &global),
        Command::Metadata(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log directive for the given flags. `RUST_LOG` takes precedence.
fn default_directive(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
