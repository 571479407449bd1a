//! Watch command — follow a room live.
//!
//! Spawns a [`RoomSession`](crate::session::RoomSession): one timer polls
//! the room and prints new messages, another refreshes the presence
//! heartbeat. Ctrl-C stops scheduling and exits; an in-flight poll is
//! allowed to finish and its output is discarded.

use crate::commands::render::format_record;
use crate::config::{self, Config};
use crate::session::{EventSink, RoomSession, SessionOptions};
use anyhow::{Context, Result};
use clap::Args;
use dropchat_core::{layout, TailEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for `dropchat watch`
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Room to follow
    pub room: String,

    /// User display name (defaults to DROPCHAT_USER or config.toml)
    #[arg(long = "as")]
    pub user: Option<String>,

    /// Number of recent messages to show on start (default: 50)
    #[arg(short = 'n', long = "last", default_value_t = 50)]
    pub last: usize,

    /// Poll interval in seconds (defaults to config or 2)
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the watch command. Blocks until Ctrl-C.
pub fn execute(args: WatchArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;
    let user = config::resolve_user(args.user, &config)?;

    // Room readiness before the first write or poll.
    layout::ensure_room(&root, &args.room)
        .with_context(|| format!("Failed to initialize room '{}'", args.room))?;

    let options = SessionOptions {
        poll_interval: args
            .poll_interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.poll_interval()),
        heartbeat_interval: config.heartbeat_interval(),
        max_initial: args.last,
    };

    let room = args.room.clone();
    let on_event: EventSink = Arc::new(move |event| match event {
        TailEvent::Reset { records } => {
            if records.is_empty() {
                println!("No messages in '{room}' yet. Waiting...");
            } else {
                println!("── last {} message(s) in '{room}' ──", records.len());
                for record in &records {
                    println!("{}", format_record(record));
                }
            }
        }
        TailEvent::Append { records } => {
            for record in &records {
                println!("{}", format_record(record));
            }
        }
    });

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime.block_on(async {
        let session = RoomSession::spawn(root, args.room, user, options, on_event);
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        println!("\nStopping...");
        session.shutdown().await;
        Ok(())
    })
}
