mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_artifacts, cmd_build, cmd_classify, cmd_info, cmd_plan};
use output::OutputFormat;

/// modswap - build stable modules from pre-built artifacts
#[derive(Parser)]
#[command(name = "modswap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Workspace root containing modswap.toml
  #[arg(long, global = true, default_value = ".")]
  root: PathBuf,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which modules are active and which are stable
  Classify {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List artifacts in the store
  Artifacts {
    /// Only list artifacts of this module name
    module: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show rewritten dependencies, publications and tasks without running anything
  Plan {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Configure, assemble and publish
  Build {
    /// Maximum number of tasks running at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Highlight steps slower than this (e.g., "500ms", "2s")
    #[arg(long, value_parser = humantime::parse_duration)]
    slow: Option<Duration>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show workspace, store and configuration details
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Classify { output } => cmd_classify(&cli.root, output),
    Commands::Artifacts { module, output } => cmd_artifacts(&cli.root, module.as_deref(), cli.verbose, output),
    Commands::Plan { output } => cmd_plan(&cli.root, cli.verbose, output),
    Commands::Build { jobs, slow, output } => cmd_build(&cli.root, jobs, slow, output),
    Commands::Info { output } => cmd_info(&cli.root, output),
  }
}
