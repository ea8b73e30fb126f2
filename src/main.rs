//! PROTPREP CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, run the single
//! target or batch, and exit with appropriate status. Per-target failures are
//! recorded in the run log and do not change the exit status.
//! For programmatic use, prefer the library API (`protprep::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
