//! Init command — create a room's directories on the shared root.
//!
//! This is the "room readiness" step every writer depends on: the core
//! treats a missing directory as a retryable condition and never creates
//! room structure on its read paths.

use crate::config::{self, Config};
use anyhow::{Context, Result};
use clap::Args;
use dropchat_core::layout;
use std::path::PathBuf;

/// Arguments for `dropchat init`
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Room to create
    pub room: String,

    /// Also enable presence on this share (creates the presence/ directory)
    #[arg(long)]
    pub presence: bool,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the init command.
pub fn execute(args: InitArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;

    layout::ensure_room(&root, &args.room)
        .with_context(|| format!("Failed to initialize room '{}'", args.room))?;
    println!("Initialized room '{}' at {}", args.room, layout::room_dir(&root, &args.room).display());

    if args.presence {
        layout::ensure_presence(&root).context("Failed to create presence directory")?;
        println!("Enabled presence at {}", layout::presence_dir(&root).display());
    }

    Ok(())
}
