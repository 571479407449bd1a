//! Tail command — show the most recent messages in a room.

use crate::commands::render::format_record;
use crate::config::{self, Config};
use anyhow::Result;
use clap::Args;
use dropchat_core::{StoreError, TailEvent, Tailer};
use std::path::PathBuf;

/// Arguments for `dropchat tail`
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Room to read
    pub room: String,

    /// Number of messages to show (default: 20)
    #[arg(short = 'n', long = "last", default_value_t = 20)]
    pub last: usize,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the tail command.
pub fn execute(args: TailArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;

    let mut tailer = Tailer::new(&root, &args.room).max_initial(args.last);
    match tailer.poll() {
        Ok(Some(TailEvent::Reset { records })) => {
            if records.is_empty() {
                println!("No messages in '{}' yet.", args.room);
            }
            for record in records {
                println!("{}", format_record(&record));
            }
            Ok(())
        }
        Ok(other) => {
            // The first poll of a fresh Tailer is always a reset.
            anyhow::bail!("unexpected poll result: {other:?}")
        }
        Err(StoreError::DirectoryMissing { .. }) => {
            println!(
                "Room '{}' is not initialized on this share (run `dropchat init {}`).",
                args.room, args.room
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
