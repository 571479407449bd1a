//! The per-room message spool: append-by-new-file, never mutated.
//!
//! A post validates its input, stamps `(ts, id)`, derives the record file
//! name, and hands the record to the atomic writer. One post is always one
//! brand-new file; concurrent writers coordinate only through distinct file
//! names.

use crate::io::{atomic, error::StoreError};
use crate::layout;
use crate::naming;
use crate::schema::{Attachment, MessageKind, MessageRecord};
use crate::text;
use chrono::{DateTime, SecondsFormat, Utc};

/// Bound on fresh-token retries when a record name collides. Two collisions
/// in a row mean something other than bad luck is wrong with the directory.
pub const MAX_POST_ATTEMPTS: u32 = 3;

/// Post a message to `room`, stamped with the current wall clock.
///
/// See [`post_at`] for the full contract.
pub fn post(
    root: &std::path::Path,
    room: &str,
    from: &str,
    text: &str,
    attachments: Vec<Attachment>,
    reply_to: Option<String>,
) -> Result<MessageRecord, StoreError> {
    post_at(root, room, from, text, attachments, reply_to, Utc::now())
}

/// Post a message to `room` with an explicit timestamp.
///
/// Validates `text` (non-empty after trimming, no null bytes, size cap) and
/// `from` (non-empty), ensures the room's subdirectories exist, then writes
/// one brand-new record file. On a record-name collision the write is
/// retried with a fresh random token, bounded by [`MAX_POST_ATTEMPTS`].
///
/// Returns the fully-populated record so the caller can render it
/// optimistically before the next poll cycle observes it.
///
/// # Errors
///
/// [`StoreError::Validation`] for bad input (never retried),
/// [`StoreError::Io`]/[`StoreError::DirectoryMissing`] when the share is
/// unreachable, [`StoreError::NameCollision`] if every attempt collided.
pub fn post_at(
    root: &std::path::Path,
    room: &str,
    from: &str,
    text: &str,
    attachments: Vec<Attachment>,
    reply_to: Option<String>,
    now: DateTime<Utc>,
) -> Result<MessageRecord, StoreError> {
    if from.trim().is_empty() {
        return Err(StoreError::Validation {
            message: "Sender name is empty".to_string(),
        });
    }
    text::validate_message_text(text, text::DEFAULT_MAX_MESSAGE_BYTES)
        .map_err(|message| StoreError::Validation { message })?;

    layout::ensure_room(root, room)?;

    let now = naming::truncate_to_millis(now);
    let ts = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let dir = layout::msgs_dir(root, room);

    let mut attempt = 0;
    loop {
        attempt += 1;
        let id = naming::random_token();
        let record = MessageRecord {
            id: id.clone(),
            ts: ts.clone(),
            room: room.to_string(),
            from: from.to_string(),
            kind: MessageKind::Msg,
            text: text.to_string(),
            reply_to: reply_to.clone(),
            attachments: attachments.clone(),
        };
        match atomic::write_new(&dir, &naming::record_file_name(now, &id), &record) {
            Ok(_) => return Ok(record),
            Err(StoreError::NameCollision { path }) if attempt < MAX_POST_ATTEMPTS => {
                tracing::warn!(
                    "record name collision at {}, retrying with a fresh token",
                    path.display()
                );
            }
            Err(e) => return Err(e),
        }
    }
}
