//! Halotool: halo catalog analysis CLI
//!
//! Computes mass functions, stacked mass profiles and catalog
//! cross-matches from Rockstar ASCII catalogs and Gadget snapshots.

mod cli;
mod hmf;
mod hmp;
mod match_errors;
mod matchfinder;
mod report;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        eprintln!("Verbose mode enabled");
    }

    match &cli.command {
        Commands::Hmf(args) => hmf::run(args, &cli),
        Commands::Hmp(args) => hmp::run(args, &cli),
        Commands::Match(args) => matchfinder::run(args, &cli),
        Commands::MatchErrors(args) => match_errors::run(args, &cli),
        Commands::Report(args) => report::run(args, &cli),
    }
}
