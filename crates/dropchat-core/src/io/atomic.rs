//! Atomic single-record writes via temp-file-then-rename.
//!
//! A record is serialized as single-line JSON with exactly one trailing
//! newline into a uniquely-named temp file in the *same* directory as the
//! final name, fsynced, then renamed into place. Rename is the only mutation
//! visible under the final name, so readers never observe truncated content
//! or a mix of two writes. Cross-directory renames are not guaranteed atomic
//! on network file systems, hence the same-directory requirement.
//!
//! Temp files are dot-prefixed; directory listings skip dot-prefixed names,
//! so an in-progress write is invisible to readers.

use crate::io::error::StoreError;
use crate::naming;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `payload` under `final_name`, failing with
/// [`StoreError::NameCollision`] if the name is already taken.
///
/// This is the message-spool write: one post is always one brand-new file.
/// On collision the caller retries with a fresh random token.
///
/// # Errors
///
/// [`StoreError::DirectoryMissing`] when `dir` does not exist (the room is
/// not initialized or the share is unreachable), [`StoreError::NameCollision`]
/// when `final_name` exists, [`StoreError::Io`] otherwise.
pub fn write_new<T: Serialize>(
    dir: &Path,
    final_name: &str,
    payload: &T,
) -> Result<PathBuf, StoreError> {
    write_record(dir, final_name, payload, true)
}

/// Write `payload` under `final_name`, replacing any existing file.
///
/// This is the presence-heartbeat write: the per-user file is overwritten in
/// place, atomically, on every beat.
///
/// # Errors
///
/// [`StoreError::DirectoryMissing`] when `dir` does not exist,
/// [`StoreError::Io`] otherwise.
pub fn write_replace<T: Serialize>(
    dir: &Path,
    final_name: &str,
    payload: &T,
) -> Result<PathBuf, StoreError> {
    write_record(dir, final_name, payload, false)
}

/// Serialize `payload` as one JSON line with exactly one trailing newline.
pub fn to_json_line<T: Serialize>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut line = serde_json::to_vec(payload)?;
    line.push(b'\n');
    Ok(line)
}

fn write_record<T: Serialize>(
    dir: &Path,
    final_name: &str,
    payload: &T,
    exclusive: bool,
) -> Result<PathBuf, StoreError> {
    let final_path = dir.join(final_name);
    let line = to_json_line(payload).map_err(|e| StoreError::Json {
        path: final_path.clone(),
        source: e,
    })?;

    // Unique per call: final name plus fresh entropy.
    let tmp_path = dir.join(format!(".{final_name}.{}.tmp", naming::random_token()));

    let mut tmp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|e| StoreError::from_dir_io(dir, e))?;

    let write_result = tmp_file
        .write_all(&line)
        .and_then(|()| tmp_file.sync_all());
    drop(tmp_file);
    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: tmp_path,
            source: e,
        });
    }

    // rename(2) silently replaces an existing target, so exclusivity is a
    // pre-rename existence check. The token space makes the remaining window
    // negligible; callers retry with a fresh token on collision.
    if exclusive && final_path.exists() {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::NameCollision { path: final_path });
    }

    fs::rename(&tmp_path, &final_path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io {
            path: final_path.clone(),
            source: e,
        }
    })?;

    Ok(final_path)
}
