//! `toolhub` unified CLI.
//!
//! A thin surface over discovery: point it at a config file and it scans,
//! validates, or lists the tools that configuration would register.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "toolhub")]
#[command(about = "Scan, verify, and list tool hub configuration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the runtime configuration file (YAML or JSON).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan configured roots and report how many tools were discovered.
    Scan,
    /// Load and validate configuration, reporting advisory warnings and
    /// discovery errors without registering anything.
    Verify,
    /// Scan configured roots and print the discovered tools.
    List {
        /// Rendering level: short (names only), normal (name/kind/version), full (everything).
        #[arg(long, value_enum, default_value_t = commands::list::Detail::Normal)]
        detail: commands::list::Detail,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let Some(config_path) = cli.config else {
        eprintln!("error: --config/-c is required");
        return ExitCode::FAILURE;
    };

    let outcome = match cli.command {
        Commands::Scan => commands::scan::run(&config_path),
        Commands::Verify => commands::verify::run(&config_path),
        Commands::List { detail } => commands::list::run(&config_path, detail),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
