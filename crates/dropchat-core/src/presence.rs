//! Heartbeat/TTL presence on the same atomic-write/list substrate.
//!
//! Each user owns one file under `presence/`, atomically rewritten on every
//! heartbeat. Liveness is derived from freshness, not explicit leave events:
//! a user is present iff `now − freshness ≤ ttl`.
//!
//! Freshness comes from the entry's embedded `ts` field, because network
//! transports are known to mangle file modification times. The file's mtime
//! is a fallback only when the body cannot be parsed, so the TTL boundary
//! behaves exactly as the embedded `ts` says.
//!
//! A missing `presence/` directory means the feature is not enabled on this
//! share; both operations report that distinctly instead of failing.

use crate::io::{atomic, error::StoreError, listing};
use crate::layout;
use crate::naming::RECORD_EXT;
use crate::schema::PresenceEntry;
use crate::text::sanitize_token;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::Path;

/// Write a liveness file for `user`, stamped `now`.
///
/// `user` is sanitized to a file-system-safe token for the file name; the
/// body keeps the original display name.
///
/// Returns `Ok(true)` when the heartbeat was written, `Ok(false)` when the
/// presence directory is missing (feature disabled, not an error).
///
/// # Errors
///
/// [`StoreError::Validation`] when `user` sanitizes to nothing,
/// [`StoreError::Io`] for write failures.
pub fn heartbeat(root: &Path, user: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
    let token = sanitize_token(user);
    if token.is_empty() {
        return Err(StoreError::Validation {
            message: format!("User name {user:?} has no file-system-safe characters"),
        });
    }

    let entry = PresenceEntry {
        user: user.to_string(),
        ts: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    let dir = layout::presence_dir(root);
    match atomic::write_replace(&dir, &format!("{token}{RECORD_EXT}"), &entry) {
        Ok(_) => Ok(true),
        Err(StoreError::DirectoryMissing { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// List users whose latest heartbeat is at most `ttl_seconds` old.
///
/// Returns `Ok(None)` when the presence directory is missing (feature
/// disabled), otherwise a case-insensitively deduplicated, sorted list of
/// display names. Unparsable entries fall back to the file-name token and
/// to mtime freshness; per-file failures are logged and skipped without
/// failing the scan.
///
/// # Errors
///
/// [`StoreError::Io`] only when the directory listing itself fails for a
/// reason other than absence.
pub fn scan(
    root: &Path,
    ttl_seconds: i64,
    now: DateTime<Utc>,
) -> Result<Option<Vec<String>>, StoreError> {
    let dir = layout::presence_dir(root);
    let names = match listing::since(&dir, "") {
        Ok(result) => result.names,
        Err(StoreError::DirectoryMissing { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let ttl = chrono::Duration::seconds(ttl_seconds);
    let mut users = Vec::new();
    for name in names {
        let Some(token) = name.strip_suffix(RECORD_EXT) else {
            continue;
        };
        let path = dir.join(&name);
        let (display, freshness) = match read_entry(&path) {
            Some(entry) => entry,
            None => {
                // Fall back to the token and the file's own mtime.
                tracing::warn!("unparsable presence entry {}, using fallbacks", path.display());
                match file_mtime(&path) {
                    Some(mtime) => (token.to_string(), mtime),
                    None => continue,
                }
            }
        };
        if now.signed_duration_since(freshness) <= ttl {
            users.push(display);
        }
    }

    users.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    users.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
    Ok(Some(users))
}

fn read_entry(path: &Path) -> Option<(String, DateTime<Utc>)> {
    let raw = fs::read_to_string(path).ok()?;
    let entry: PresenceEntry = serde_json::from_str(raw.trim_end()).ok()?;
    let ts = DateTime::parse_from_rfc3339(&entry.ts).ok()?.with_timezone(&Utc);
    Some((entry.user, ts))
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(modified.into())
}
