use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cambuffer_manager::commands::{self, show::Format};
use cambuffer_manager::config;

#[derive(Parser)]
#[command(name = "cambuffer")]
#[command(about = "Inspect the camera buffer recorder launch")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the launch descriptor handed to the supervisor
    Show {
        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Parameter override file (YAML, TOML or JSON)
        #[arg(short = 'p', long = "params", value_name = "FILE")]
        params: Option<PathBuf>,
    },

    /// Print the command line each node is started with
    Args {
        /// Parameter override file (YAML, TOML or JSON)
        #[arg(short = 'p', long = "params", value_name = "FILE")]
        params: Option<PathBuf>,
    },

    /// Check that every node would pass its configure transition
    Check {
        /// Parameter override file (YAML, TOML or JSON)
        #[arg(short = 'p', long = "params", value_name = "FILE")]
        params: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "cambuffer_manager=debug,cambuffer_core=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Show { format, params } => {
            let descriptor = load(params)?;
            commands::show::run_show(descriptor, format)
        }
        Commands::Args { params } => commands::args::run_args(&load(params)?),
        Commands::Check { params } => commands::check::run_check(&load(params)?),
    }
}

fn load(params: Option<PathBuf>) -> Result<cambuffer_core::LaunchDescriptor> {
    let params_file = config::resolve_params_file(params, config::params_file_from_env());
    config::load_descriptor(params_file.as_deref())
}
