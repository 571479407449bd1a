//! Compact command — fold a room's message spool into daily logs.

use crate::config::{self, Config};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;
use dropchat_core::{compactor, CutoffPolicy, StoreError};
use std::path::PathBuf;

/// Arguments for `dropchat compact`
#[derive(Args, Debug)]
pub struct CompactArgs {
    /// Room to compact
    pub room: String,

    /// Compact everything before today (the default)
    #[arg(long, conflicts_with_all = ["exclude_today", "through"])]
    pub through_yesterday: bool,

    /// Same cutoff as --through-yesterday, labeled as an exclusion
    #[arg(long, conflicts_with = "through")]
    pub exclude_today: bool,

    /// Compact everything through this UTC date, inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub through: Option<NaiveDate>,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl CompactArgs {
    fn policy(&self) -> CutoffPolicy {
        if let Some(date) = self.through {
            CutoffPolicy::ThroughDate(date)
        } else if self.exclude_today {
            CutoffPolicy::ExcludeToday
        } else {
            CutoffPolicy::ThroughYesterday
        }
    }
}

/// Execute the compact command.
///
/// Lock contention is an expected, informational outcome (another client is
/// already compacting this room) and is reported without failing.
pub fn execute(args: CompactArgs) -> Result<()> {
    let config = Config::load();
    let policy = args.policy();
    let root = config::resolve_root(args.root, &config)?;

    match compactor::compact(&root, &args.room, policy, Utc::now()) {
        Ok(summary) => {
            println!(
                "Compacted '{}' {}: {} considered, {} appended, {} skipped, {} day(s) touched",
                args.room,
                policy.label(),
                summary.considered,
                summary.appended,
                summary.skipped,
                summary.days_touched
            );
            Ok(())
        }
        Err(StoreError::LockUnavailable {
            expires_at, detail, ..
        }) => {
            let holder = detail.unwrap_or_else(|| "another process".to_string());
            match expires_at {
                Some(expires_at) => println!(
                    "Compaction skipped: lock held by {holder} (expires {expires_at})."
                ),
                None => println!("Compaction skipped: lock held by {holder}."),
            }
            Ok(())
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
