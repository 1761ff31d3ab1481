use anyhow::Result;
use clap::{Parser, Subcommand};
use scenario_lifecycle::commands::{normalize, show_config, simulate};
use scenario_lifecycle::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenario-lifecycle")]
#[command(about = "Per-run context and device-session lifecycle for concurrent test runs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a YAML suite through the lifecycle on a simulated device farm
    Simulate {
        /// Path to the suite file
        suite: PathBuf,

        /// Number of worker threads (overrides the suite's `threads`)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write telemetry records as JSON lines to this file
        #[arg(long)]
        telemetry: Option<PathBuf>,
    },

    /// Print the filesystem-safe form of a scenario name
    Normalize {
        /// Scenario name
        name: String,
    },

    /// Show the resolved configuration
    Config {
        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init("info");

    match cli.command {
        Commands::Simulate {
            suite,
            threads,
            config,
            telemetry,
        } => simulate::execute(&suite, threads, config.as_deref(), telemetry.as_deref()),
        Commands::Normalize { name } => normalize::execute(&name),
        Commands::Config { config } => show_config::execute(config.as_deref()),
    }
}
