//! TTL lock files for single-writer critical sections.
//!
//! Mutual exclusion built on the one primitive network file systems offer
//! atomically: exclusive file creation. The lock file's body is a single
//! JSON line of [`LockMetadata`]; a lock is held iff the file exists *and*
//! `now < expiresAt`. An existing-but-expired lock file is treated as absent
//! and removed before re-acquisition, so a crashed holder cannot wedge the
//! system past its TTL.
//!
//! The TTL is a safety net, not a renewal mechanism: critical sections must
//! choose a TTL exceeding their worst-case duration.

use crate::io::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bound on acquisition attempts. Stale-lock cleanup re-enters the creation
/// race, and two processes repeatedly deleting each other's fresh locks
/// would otherwise livelock; after this many attempts the caller gets
/// [`StoreError::LockUnavailable`].
pub const MAX_ACQUIRE_ATTEMPTS: u32 = 3;

/// Body of a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockMetadata {
    /// RFC 3339 instant the lock was taken.
    pub created_at: String,

    /// RFC 3339 instant after which the lock no longer counts as held.
    pub expires_at: String,

    /// Free-form holder description for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LockMetadata {
    fn new(now: DateTime<Utc>, ttl: chrono::Duration, detail: &str) -> Self {
        Self {
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            expires_at: (now + ttl).to_rfc3339_opts(SecondsFormat::Millis, true),
            detail: if detail.is_empty() {
                None
            } else {
                Some(detail.to_string())
            },
        }
    }

    /// A lock is expired once `now` reaches `expires_at`. An unparsable
    /// expiry counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires) => now >= expires.with_timezone(&Utc),
            Err(_) => true,
        }
    }
}

/// Removes the lock file when dropped, so release survives early returns
/// and panics inside the critical section.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("failed to release lock {}: {e}", self.path.display());
        }
    }
}

/// Run `f` while holding the lock at `lock_path`.
///
/// Acquisition attempts exclusive creation; on failure the existing lock's
/// metadata decides: unreadable or expired locks are removed and acquisition
/// retried (bounded by [`MAX_ACQUIRE_ATTEMPTS`]), valid locks fail
/// immediately with [`StoreError::LockUnavailable`] carrying the holder's
/// expiry and detail. The lock file is removed whether `f` succeeds or
/// fails.
///
/// # Errors
///
/// [`StoreError::LockUnavailable`] on contention, [`StoreError::Io`] or
/// [`StoreError::DirectoryMissing`] when the lock file cannot be created,
/// plus whatever `f` returns.
pub fn with_lock<T>(
    lock_path: &Path,
    ttl: Duration,
    detail: &str,
    f: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let _guard = acquire(lock_path, ttl, detail)?;
    f()
}

fn acquire(lock_path: &Path, ttl: Duration, detail: &str) -> Result<LockGuard, StoreError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|_| StoreError::Validation {
        message: format!("Lock TTL out of range: {ttl:?}"),
    })?;

    for _attempt in 0..MAX_ACQUIRE_ATTEMPTS {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)
        {
            Ok(mut file) => {
                let metadata = LockMetadata::new(Utc::now(), ttl, detail);
                let write_result = crate::io::atomic::to_json_line(&metadata)
                    .map_err(|e| StoreError::Json {
                        path: lock_path.to_path_buf(),
                        source: e,
                    })
                    .and_then(|line| {
                        file.write_all(&line)
                            .and_then(|()| file.sync_all())
                            .map_err(|e| StoreError::Io {
                                path: lock_path.to_path_buf(),
                                source: e,
                            })
                    });
                drop(file);
                if let Err(e) = write_result {
                    let _ = fs::remove_file(lock_path);
                    return Err(e);
                }
                return Ok(LockGuard {
                    path: lock_path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                match read_metadata(lock_path) {
                    Some(metadata) if !metadata.is_expired(Utc::now()) => {
                        return Err(StoreError::LockUnavailable {
                            path: lock_path.to_path_buf(),
                            expires_at: Some(metadata.expires_at),
                            detail: metadata.detail,
                        });
                    }
                    _ => {
                        // Stale or unreadable: treat as absent and retry.
                        tracing::debug!("removing stale lock {}", lock_path.display());
                        let _ = fs::remove_file(lock_path);
                    }
                }
            }
            Err(e) => {
                return Err(StoreError::from_dir_io(
                    lock_path.parent().unwrap_or(lock_path),
                    e,
                ));
            }
        }
    }

    // Creation kept failing even after cleanup: another process is winning
    // the re-creation race. Surface contention instead of looping forever.
    Err(StoreError::LockUnavailable {
        path: lock_path.to_path_buf(),
        expires_at: None,
        detail: None,
    })
}

fn read_metadata(lock_path: &Path) -> Option<LockMetadata> {
    let content = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(content.trim_end()).ok()
}
