//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod compact;
mod heartbeat;
mod init;
mod post;
mod render;
mod tail;
mod watch;
mod who;

/// dropchat - serverless chat over a shared network folder
#[derive(Parser, Debug)]
#[command(
    name = "dropchat",
    version,
    about = "Serverless chat over a shared network folder",
    long_about = "Rooms, messages, and presence stored as plain files on a shared \
                  folder. No server process: every client talks to the file system."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a room's directories on the shared root
    Init(init::InitArgs),

    /// Post a message to a room
    Post(post::PostArgs),

    /// Show the most recent messages in a room
    Tail(tail::TailArgs),

    /// Follow a room live: poll for messages and heartbeat presence
    Watch(watch::WatchArgs),

    /// List users with a fresh presence heartbeat
    Who(who::WhoArgs),

    /// Write a single presence heartbeat
    Heartbeat(heartbeat::HeartbeatArgs),

    /// Fold a room's message spool into daily logs
    Compact(compact::CompactArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Init(args) => init::execute(args),
            Commands::Post(args) => post::execute(args),
            Commands::Tail(args) => tail::execute(args),
            Commands::Watch(args) => watch::execute(args),
            Commands::Who(args) => who::execute(args),
            Commands::Heartbeat(args) => heartbeat::execute(args),
            Commands::Compact(args) => compact::execute(args),
        }
    }
}
