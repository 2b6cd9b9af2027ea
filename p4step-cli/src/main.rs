//! p4step — Perforce workspace sync step runner.
//!
//! # Usage
//!
//! ```text
//! p4step check <step.yaml>
//! p4step client-spec <step.yaml> [--builddir <dir>] [--property k=v]... [--properties <file>]
//! p4step plan <step.yaml> [--revision <rev>] [--json] [property args]
//! p4step run <step.yaml> [--revision <rev>] [--json] [property args]
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the default `info` filter.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    check::CheckArgs, client_spec::ClientSpecArgs, plan::PlanArgs, run::RunArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "p4step",
    version,
    about = "Prepare and sync Perforce workspaces for a build",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a step file and report every problem found.
    Check(CheckArgs),

    /// Print the client specification the step would register.
    ClientSpec(ClientSpecArgs),

    /// Show the commands the step would run, without running them.
    Plan(PlanArgs),

    /// Sync the workspace and publish the revision it landed on.
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::ClientSpec(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Run(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
