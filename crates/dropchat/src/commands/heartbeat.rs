//! Heartbeat command — write a single presence heartbeat.

use crate::config::{self, Config};
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use dropchat_core::presence;
use std::path::PathBuf;

/// Arguments for `dropchat heartbeat`
#[derive(Args, Debug)]
pub struct HeartbeatArgs {
    /// User display name (defaults to DROPCHAT_USER or config.toml)
    #[arg(long = "as")]
    pub user: Option<String>,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the heartbeat command.
pub fn execute(args: HeartbeatArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;
    let user = config::resolve_user(args.user, &config)?;

    if presence::heartbeat(&root, &user, Utc::now())? {
        println!("Heartbeat written for {user}");
    } else {
        println!("Presence is not enabled on this share (no presence/ directory).");
    }
    Ok(())
}
