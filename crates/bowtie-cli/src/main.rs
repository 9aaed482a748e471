#![forbid(unsafe_code)]

mod cmd;
mod load;
mod output;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bowtie_core::config::{AnalysisConfig, load_config};
use bowtie_core::error::ErrorCode;
use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, WithCode, classify_error, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bt: bow-tie structure of directed link graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Analysis config file (TOML).
    #[arg(long, global = true, value_name = "FILE", default_value = "bowtie.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Decompose a graph into bow-tie regions",
        long_about = "Find the giant strongly connected component, classify every other \
                      component as IN, OUT, TENDRIL, TUBE or DISCONNECTED, and rank nodes \
                      by PageRank and in-degree.",
        after_help = "EXAMPLES:\n    # Analyse an edge list\n    bt analyze edges.txt\n\n    # Attach URLs and keep the top 1000 PageRank entries\n    bt analyze edges.txt --labels urls.txt --top 1000\n\n    # Only list TUBE nodes, as JSON\n    bt analyze edges.txt --region tube --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List strongly connected components",
        after_help = "EXAMPLES:\n    # Components with at least two nodes\n    bt components edges.txt --min-size 2"
    )]
    Components(cmd::components::ComponentsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Check whether one node reaches another",
        after_help = "EXAMPLES:\n    # Directed query\n    bt reach edges.txt 12 873\n\n    # Ignore edge direction\n    bt reach edges.txt 12 873 --undirected"
    )]
    Reach(cmd::reach::ReachArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    bt completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BOWTIE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "bowtie=debug,info"
        } else {
            "bowtie=info,warn"
        })
    });

    let format = env::var("BOWTIE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let config = load_config(path).with_code(ErrorCode::ConfigParseError)?;
    debug!(path = %path.display(), "config resolved");
    Ok(config)
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Analyze(args) => {
            cmd::analyze::run_analyze(args, output, &load_settings(&cli.config)?)
        }
        Commands::Components(args) => {
            let config = load_settings(&cli.config)?;
            cmd::components::run_components(args, output, config.load.node_limit)
        }
        Commands::Reach(args) => {
            let config = load_settings(&cli.config)?;
            cmd::reach::run_reach(args, output, config.load.node_limit)
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = cli.output_mode();

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &classify_error(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
