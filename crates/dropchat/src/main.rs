//! dropchat - serverless chat over a shared network folder
//!
//! A thin CLI over the shared-root file API, providing post, tail, watch,
//! presence, and compaction commands with atomic file I/O.

use clap::Parser;

mod commands;
mod config;
mod session;

use commands::Cli;

fn main() {
    dropchat_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
