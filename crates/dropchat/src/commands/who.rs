//! Who command — list users with a fresh presence heartbeat.

use crate::config::{self, Config};
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use dropchat_core::presence;
use std::path::PathBuf;

/// Arguments for `dropchat who`
#[derive(Args, Debug)]
pub struct WhoArgs {
    /// Staleness window in seconds (defaults to config or 90)
    #[arg(long)]
    pub ttl: Option<i64>,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the who command.
pub fn execute(args: WhoArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;
    let ttl = args.ttl.unwrap_or_else(|| config.presence_ttl_secs());

    match presence::scan(&root, ttl, Utc::now())? {
        None => {
            println!("Presence is not enabled on this share (no presence/ directory).");
        }
        Some(users) if users.is_empty() => {
            println!("No one has heartbeat within the last {ttl}s.");
        }
        Some(users) => {
            for user in users {
                println!("{user}");
            }
        }
    }
    Ok(())
}
