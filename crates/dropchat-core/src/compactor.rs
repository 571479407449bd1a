//! Lock-protected compaction of a room's spool into daily NDJSON logs.
//!
//! Compaction is the only operation that mutates the spool, so it runs under
//! the room's TTL lock. The walk is append-then-delete, never the reverse: a
//! crash between the two steps leaves the record in both the spool and the
//! log (re-processed on the next run; at-least-once into the log) and never
//! in neither. Each log line is the record's original serialized bytes, so
//! the log replays exactly what the spool held.
//!
//! Per-file problems (unreadable, invalid JSON, unparsable `ts`) are logged,
//! counted as skipped, and never abort the run. Only lock contention or a
//! failed spool listing aborts outright.

use crate::io::{error::StoreError, listing, lock};
use crate::layout;
use crate::schema::MessageRecord;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Lock TTL. A safety net for crashed runs, not a renewal mechanism; sized
/// well past the worst-case duration of a large spool walk.
pub const COMPACTION_LOCK_TTL: Duration = Duration::from_secs(600);

/// Which records are due for compaction. Cutoffs and date keys share one
/// reference time zone (UTC); records with `ts >= cutoff` are not yet due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffPolicy {
    /// Compact everything before the start of the current UTC day.
    ThroughYesterday,

    /// Same cutoff as [`CutoffPolicy::ThroughYesterday`], surfaced under a
    /// different label in user-facing summaries.
    ExcludeToday,

    /// Compact everything through the given UTC date, inclusive.
    ThroughDate(NaiveDate),
}

impl CutoffPolicy {
    /// The exclusive upper bound on due record timestamps.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let day = match self {
            CutoffPolicy::ThroughYesterday | CutoffPolicy::ExcludeToday => now.date_naive(),
            CutoffPolicy::ThroughDate(date) => {
                date.checked_add_days(Days::new(1)).unwrap_or(*date)
            }
        };
        day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Human-readable label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            CutoffPolicy::ThroughYesterday => "through yesterday",
            CutoffPolicy::ExcludeToday => "excluding today",
            CutoffPolicy::ThroughDate(_) => "through date",
        }
    }
}

/// Result of one compaction run. Pure computation output, not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactionSummary {
    /// Spool files examined.
    pub considered: usize,
    /// Records appended to a daily log (and deleted from the spool).
    pub appended: usize,
    /// Files skipped: unreadable, invalid JSON, or unparsable `ts`.
    pub skipped: usize,
    /// Distinct daily logs appended to.
    pub days_touched: usize,
}

/// Compact `room`'s spool under its compaction lock.
///
/// # Errors
///
/// [`StoreError::LockUnavailable`] when another compaction holds the lock,
/// [`StoreError::DirectoryMissing`]/[`StoreError::Io`] when the room is not
/// initialized or the spool listing fails. Per-file failures do not error;
/// they are counted in the summary.
pub fn compact(
    root: &Path,
    room: &str,
    policy: CutoffPolicy,
    now: DateTime<Utc>,
) -> Result<CompactionSummary, StoreError> {
    layout::validate_room_key(room)?;
    let cutoff = policy.cutoff(now);
    let lock_path = layout::compaction_lock_path(root, room);
    lock::with_lock(
        &lock_path,
        COMPACTION_LOCK_TTL,
        &format!("compact {room} {}", policy.label()),
        || compact_locked(root, room, cutoff),
    )
}

fn compact_locked(
    root: &Path,
    room: &str,
    cutoff: DateTime<Utc>,
) -> Result<CompactionSummary, StoreError> {
    let msgs_dir = layout::msgs_dir(root, room);
    // Ascending name order is chronological order; the only failure that
    // aborts the run.
    let names = listing::since(&msgs_dir, "")?.names;

    let mut summary = CompactionSummary::default();
    let mut days = BTreeSet::new();

    for name in names {
        summary.considered += 1;
        let path = msgs_dir.join(&name);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("compaction skipping unreadable {}: {e}", path.display());
                summary.skipped += 1;
                continue;
            }
        };
        let ts = match record_instant(&raw) {
            Some(ts) => ts,
            None => {
                tracing::warn!("compaction skipping malformed {}", path.display());
                summary.skipped += 1;
                continue;
            }
        };
        if ts >= cutoff {
            // Not yet due; stays in the spool, not a skip.
            continue;
        }

        let day = ts.format("%Y-%m-%d").to_string();
        let log_path = layout::log_file(root, room, &day);
        if let Err(e) = append_line(&log_path, &raw) {
            tracing::warn!("compaction failed to append to {}: {e}", log_path.display());
            summary.skipped += 1;
            continue;
        }
        summary.appended += 1;
        days.insert(day);

        // Append is durable; only now is the spool copy deleted. A failure
        // here leaves the record in both places, which the next run and log
        // readers tolerate (at-least-once).
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("compaction failed to delete {}: {e}", path.display());
        }
    }

    summary.days_touched = days.len();
    Ok(summary)
}

/// Extract the advisory timestamp from a record's serialized line. `None`
/// for invalid JSON, a non-record payload, or an unparsable `ts`.
fn record_instant(raw: &str) -> Option<DateTime<Utc>> {
    let record: MessageRecord = serde_json::from_str(raw.trim_end()).ok()?;
    let ts = DateTime::parse_from_rfc3339(&record.ts).ok()?;
    Some(ts.with_timezone(&Utc))
}

/// Append one record line, verbatim, with exactly one trailing newline, and
/// make it durable before returning.
fn append_line(path: &Path, raw: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(raw.trim_end_matches('\n').as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()
}
