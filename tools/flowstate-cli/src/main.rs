//! FlowState CLI: command-line interface for pose sequence analysis.
//!
//! Usage:
//!   flowstate analyze <FEED>     Run the pose pipeline on a detection feed
//!   flowstate validate <FEED>    Check a detection feed without analyzing it
//!   flowstate info <OUTPUT>      Show a summary of an analysis output file
//!   flowstate config             Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use flowstate_common::config::AppConfig;

mod commands;

use commands::analyze::AnalyzeArgs;

#[derive(Parser)]
#[command(
    name = "flowstate",
    about = "Movement analysis from pose detection feeds",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a detection feed and write the viewer data
    Analyze(AnalyzeArgs),

    /// Parse and normalize a detection feed without running later stages
    Validate {
        /// Path to the JSONL detection feed
        feed: PathBuf,
    },

    /// Show a summary of an analysis output file
    Info {
        /// Path to a pose_data.json written by `analyze`
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the standard location
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    flowstate_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, &config),
        Commands::Validate { feed } => commands::validate::run(feed),
        Commands::Info { path } => commands::info::run(path),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
