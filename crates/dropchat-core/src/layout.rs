//! Directory layout of the shared chat root.
//!
//! Everything lives under one shared root, typically a mounted network
//! folder:
//!
//! ```text
//! <root>/
//!   rooms/<room>/msgs/<name>.json       one message record per file
//!   rooms/<room>/attachments/...        opaque payloads
//!   rooms/<room>/logs/YYYY-MM-DD.ndjson compacted daily logs
//!   rooms/<room>/logs/.lock             compaction mutual-exclusion file
//!   presence/<user>.json                one heartbeat file per user
//! ```
//!
//! The core does not create directories on its own read paths; a missing
//! directory is a retryable condition. `ensure_room` and `ensure_presence`
//! are the "room readiness" collaborators callers invoke before writing.

use crate::io::error::StoreError;
use crate::text::sanitize_token;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of a room holding one message record per file.
pub const MSGS_SUBDIR: &str = "msgs";
/// Subdirectory of a room holding attachment payloads.
pub const ATTACHMENTS_SUBDIR: &str = "attachments";
/// Subdirectory of a room holding compacted daily logs.
pub const LOGS_SUBDIR: &str = "logs";
/// Compaction lock file name inside the logs directory.
pub const COMPACTION_LOCK_NAME: &str = ".lock";

pub fn rooms_dir(root: &Path) -> PathBuf {
    root.join("rooms")
}

pub fn room_dir(root: &Path, room: &str) -> PathBuf {
    rooms_dir(root).join(room)
}

pub fn msgs_dir(root: &Path, room: &str) -> PathBuf {
    room_dir(root, room).join(MSGS_SUBDIR)
}

pub fn attachments_dir(root: &Path, room: &str) -> PathBuf {
    room_dir(root, room).join(ATTACHMENTS_SUBDIR)
}

pub fn logs_dir(root: &Path, room: &str) -> PathBuf {
    room_dir(root, room).join(LOGS_SUBDIR)
}

pub fn compaction_lock_path(root: &Path, room: &str) -> PathBuf {
    logs_dir(root, room).join(COMPACTION_LOCK_NAME)
}

pub fn presence_dir(root: &Path) -> PathBuf {
    root.join("presence")
}

/// Path of the daily log file for a `YYYY-MM-DD` date key.
pub fn log_file(root: &Path, room: &str, day: &str) -> PathBuf {
    logs_dir(root, room).join(format!("{day}.ndjson"))
}

/// Reject room keys that cannot safely name a directory.
///
/// A room key must be non-empty, must not start with `.` (dot-prefixed names
/// are reserved for temp and lock artifacts), and must consist only of ASCII
/// alphanumerics, `.`, `_`, and `-` — the same alphabet as presence file
/// tokens. This also excludes the `..` path component.
pub fn validate_room_key(room: &str) -> Result<(), StoreError> {
    if room.is_empty() || room.starts_with('.') || sanitize_token(room) != room {
        return Err(StoreError::Validation {
            message: format!("Invalid room key: {room:?}"),
        });
    }
    Ok(())
}

/// Create the subdirectories a room requires before any write.
pub fn ensure_room(root: &Path, room: &str) -> Result<(), StoreError> {
    validate_room_key(room)?;
    for dir in [
        msgs_dir(root, room),
        attachments_dir(root, room),
        logs_dir(root, room),
    ] {
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Create the presence directory, enabling the presence feature.
pub fn ensure_presence(root: &Path) -> Result<(), StoreError> {
    let dir = presence_dir(root);
    fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
        path: dir.clone(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_follow_documented_layout() {
        let root = Path::new("/share/chat");
        assert_eq!(
            msgs_dir(root, "general"),
            PathBuf::from("/share/chat/rooms/general/msgs")
        );
        assert_eq!(
            log_file(root, "general", "2025-11-12"),
            PathBuf::from("/share/chat/rooms/general/logs/2025-11-12.ndjson")
        );
        assert_eq!(
            compaction_lock_path(root, "general"),
            PathBuf::from("/share/chat/rooms/general/logs/.lock")
        );
        assert_eq!(presence_dir(root), PathBuf::from("/share/chat/presence"));
    }

    #[test]
    fn ensure_room_creates_all_subdirs() {
        let tmp = TempDir::new().unwrap();
        ensure_room(tmp.path(), "general").unwrap();
        assert!(msgs_dir(tmp.path(), "general").is_dir());
        assert!(attachments_dir(tmp.path(), "general").is_dir());
        assert!(logs_dir(tmp.path(), "general").is_dir());
    }

    #[test]
    fn ensure_room_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        ensure_room(tmp.path(), "general").unwrap();
        ensure_room(tmp.path(), "general").unwrap();
    }

    #[test]
    fn room_key_validation() {
        assert!(validate_room_key("general").is_ok());
        assert!(validate_room_key("dev.backend_2-x").is_ok());
        assert!(validate_room_key("").is_err());
        assert!(validate_room_key("../escape").is_err());
        assert!(validate_room_key("..").is_err());
        assert!(validate_room_key(".hidden").is_err());
        assert!(validate_room_key("has space").is_err());
    }
}
