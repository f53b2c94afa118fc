//! CLI frontend for the Storyloom timeline editor core.

mod commands;
mod script;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "loom",
    about = "Storyloom: replay and render narrative timeline scripts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log editor operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for `replay`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// Human-readable tables
    Table,
    /// The final snapshot and step results as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a command script and print the resulting editor state
    Replay {
        /// Path to the JSON script
        script: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Apply a command script and draw the result as SVG
    Render {
        /// Path to the JSON script
        script: PathBuf,

        /// Drawing width
        #[arg(long, default_value = "960")]
        width: f64,

        /// Drawing height
        #[arg(long, default_value = "540")]
        height: f64,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Replay { script, format } => commands::replay::run(&script, format),
        Commands::Render {
            script,
            width,
            height,
            output,
        } => commands::render::run(&script, width, height, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
