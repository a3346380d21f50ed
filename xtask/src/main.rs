// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod step;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Jack detection workspace tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the feature matrix: no_std + defmt on Cortex-M, tracing and std on host
    Check {
        /// Skip the cross-compiled no_std builds (no thumbv7em target installed)
        #[arg(long)]
        host_only: bool,
    },
    /// Run unit, integration, property and doc tests
    Test {
        /// Run only `#[cfg(test)]` unit tests
        #[arg(long)]
        unit: bool,
        /// Run only the `tests/` integration and property suites
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { host_only } => check::run(host_only),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open } => doc::run(open),
    }
}
