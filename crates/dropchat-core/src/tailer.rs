//! Cursor-based polling over a room's message spool.
//!
//! A [`Tailer`] owns the cursor for exactly one room; the host layer holds
//! one per active room and drops it on room switch. The first poll is an
//! initial load: up to `max_initial` most-recent records as a
//! [`TailEvent::Reset`]. Every later poll lists names strictly after the
//! cursor and emits them as a [`TailEvent::Append`], or nothing when the
//! directory is unchanged.
//!
//! The cursor always advances to the last *file name* returned by the
//! listing, not the last successfully parsed record, so a permanently
//! corrupt file is skipped once and never retried forever.

use crate::io::{error::StoreError, listing};
use crate::layout;
use crate::schema::MessageRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Default snapshot size for the initial load.
pub const DEFAULT_MAX_INITIAL: usize = 50;

/// Event produced by one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum TailEvent {
    /// First activation: the full snapshot replaces whatever the consumer
    /// was showing. Emitted exactly once per Tailer, even when empty.
    Reset { records: Vec<MessageRecord> },

    /// Records that appeared since the previous poll, in name order.
    Append { records: Vec<MessageRecord> },
}

/// Polling state for one room.
#[derive(Debug)]
pub struct Tailer {
    msgs_dir: PathBuf,
    cursor: Option<String>,
    initialized: bool,
    max_initial: usize,
}

impl Tailer {
    /// Tailer for `room` with no cursor: the next poll is an initial load.
    pub fn new(root: &Path, room: &str) -> Self {
        Self {
            msgs_dir: layout::msgs_dir(root, room),
            cursor: None,
            initialized: false,
            max_initial: DEFAULT_MAX_INITIAL,
        }
    }

    /// Resume a room at a cursor the host persisted earlier. The next poll
    /// goes straight to steady state — no reset is emitted.
    pub fn with_cursor(root: &Path, room: &str, cursor: impl Into<String>) -> Self {
        Self {
            msgs_dir: layout::msgs_dir(root, room),
            cursor: Some(cursor.into()),
            initialized: true,
            max_initial: DEFAULT_MAX_INITIAL,
        }
    }

    /// Override the initial-load snapshot size.
    pub fn max_initial(mut self, n: usize) -> Self {
        self.max_initial = n;
        self
    }

    /// The last record file name this Tailer has observed, as an opaque
    /// token the host may persist.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Run one poll cycle.
    ///
    /// Returns `Ok(None)` when steady-state polling found nothing new.
    ///
    /// # Errors
    ///
    /// [`StoreError::DirectoryMissing`] when the room's spool directory is
    /// absent (retry next tick, do not alarm); [`StoreError::Io`] for other
    /// listing failures. The cursor does not move on error.
    pub fn poll(&mut self) -> Result<Option<TailEvent>, StoreError> {
        if !self.initialized {
            let names = listing::tail(&self.msgs_dir, self.max_initial)?;
            let records = self.hydrate(&names);
            if let Some(last) = names.last() {
                self.cursor = Some(last.clone());
            }
            self.initialized = true;
            return Ok(Some(TailEvent::Reset { records }));
        }

        let result = listing::since(&self.msgs_dir, self.cursor.as_deref().unwrap_or(""))?;
        tracing::debug!(
            "poll of {} examined {} names, {} new",
            self.msgs_dir.display(),
            result.examined,
            result.names.len()
        );
        if result.names.is_empty() {
            return Ok(None);
        }
        let records = self.hydrate(&result.names);
        if let Some(last) = result.names.last() {
            self.cursor = Some(last.clone());
        }
        Ok(Some(TailEvent::Append { records }))
    }

    /// Read and parse each listed name, skipping unreadable or malformed
    /// files individually. A skipped file never aborts the batch; the cursor
    /// advances past it regardless.
    fn hydrate(&self, names: &[String]) -> Vec<MessageRecord> {
        names
            .iter()
            .filter_map(|name| {
                let path = self.msgs_dir.join(name);
                let raw = match fs::read_to_string(&path) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("skipping unreadable record {}: {e}", path.display());
                        return None;
                    }
                };
                match serde_json::from_str::<MessageRecord>(raw.trim_end()) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!("skipping malformed record {}: {e}", path.display());
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    // Distinct explicit timestamps keep name order aligned with post order.
    fn post_n(root: &Path, room: &str, n: usize, offset: usize) {
        let base = DateTime::parse_from_rfc3339("2025-11-12T03:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        for i in 0..n {
            let ts = base + chrono::Duration::milliseconds((offset + i) as i64);
            spool::post_at(
                root,
                room,
                "alice",
                &format!("msg {}", offset + i),
                Vec::new(),
                None,
                ts,
            )
            .unwrap();
        }
    }

    #[test]
    fn first_poll_emits_reset_with_snapshot() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 3, 0);

        let mut tailer = Tailer::new(tmp.path(), "general");
        match tailer.poll().unwrap() {
            Some(TailEvent::Reset { records }) => {
                assert_eq!(records.len(), 3);
                assert_eq!(records[0].text, "msg 0");
                assert_eq!(records[2].text, "msg 2");
            }
            other => panic!("expected Reset, got {other:?}"),
        }
        assert!(tailer.cursor().is_some());
    }

    #[test]
    fn first_poll_on_empty_room_emits_empty_reset() {
        let tmp = TempDir::new().unwrap();
        layout::ensure_room(tmp.path(), "general").unwrap();

        let mut tailer = Tailer::new(tmp.path(), "general");
        match tailer.poll().unwrap() {
            Some(TailEvent::Reset { records }) => assert!(records.is_empty()),
            other => panic!("expected Reset, got {other:?}"),
        }
        // No names seen yet; the next poll still starts from the beginning.
        assert!(tailer.cursor().is_none());

        post_n(tmp.path(), "general", 2, 0);
        match tailer.poll().unwrap() {
            Some(TailEvent::Append { records }) => assert_eq!(records.len(), 2),
            other => panic!("expected Append, got {other:?}"),
        }
    }

    #[test]
    fn initial_load_is_capped_at_max_initial() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 6, 0);

        let mut tailer = Tailer::new(tmp.path(), "general").max_initial(4);
        match tailer.poll().unwrap() {
            Some(TailEvent::Reset { records }) => {
                assert_eq!(records.len(), 4);
                // The snapshot holds the most recent names.
                assert_eq!(records.last().unwrap().text, "msg 5");
            }
            other => panic!("expected Reset, got {other:?}"),
        }
    }

    #[test]
    fn steady_state_emits_nothing_when_unchanged() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 2, 0);

        let mut tailer = Tailer::new(tmp.path(), "general");
        tailer.poll().unwrap();
        assert_eq!(tailer.poll().unwrap(), None);
        assert_eq!(tailer.poll().unwrap(), None);
    }

    #[test]
    fn steady_state_appends_only_new_records() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 2, 0);

        let mut tailer = Tailer::new(tmp.path(), "general");
        tailer.poll().unwrap();

        post_n(tmp.path(), "general", 3, 2);
        match tailer.poll().unwrap() {
            Some(TailEvent::Append { records }) => {
                assert_eq!(records.len(), 3);
                assert_eq!(records[0].text, "msg 2");
            }
            other => panic!("expected Append, got {other:?}"),
        }
        assert_eq!(tailer.poll().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_skipped_but_cursor_advances_past_it() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 1, 0);

        let mut tailer = Tailer::new(tmp.path(), "general");
        tailer.poll().unwrap();

        // A corrupt record lands after the cursor.
        let dir = layout::msgs_dir(tmp.path(), "general");
        fs::write(dir.join("9999-01-01T00-00-00-000Z_ffffffff.json"), b"{nope").unwrap();

        match tailer.poll().unwrap() {
            Some(TailEvent::Append { records }) => assert!(records.is_empty()),
            other => panic!("expected Append with no parsable records, got {other:?}"),
        }
        assert_eq!(
            tailer.cursor(),
            Some("9999-01-01T00-00-00-000Z_ffffffff.json")
        );
        // The corrupt file is never retried.
        assert_eq!(tailer.poll().unwrap(), None);
    }

    #[test]
    fn resuming_with_cursor_skips_reset() {
        let tmp = TempDir::new().unwrap();
        post_n(tmp.path(), "general", 2, 0);

        let mut first = Tailer::new(tmp.path(), "general");
        first.poll().unwrap();
        let cursor = first.cursor().unwrap().to_string();

        post_n(tmp.path(), "general", 1, 2);
        let mut resumed = Tailer::with_cursor(tmp.path(), "general", cursor);
        match resumed.poll().unwrap() {
            Some(TailEvent::Append { records }) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].text, "msg 2");
            }
            other => panic!("expected Append, got {other:?}"),
        }
    }

    #[test]
    fn missing_room_directory_is_retryable() {
        let tmp = TempDir::new().unwrap();
        let mut tailer = Tailer::new(tmp.path(), "general");
        assert!(matches!(
            tailer.poll(),
            Err(StoreError::DirectoryMissing { .. })
        ));
        // Cursor unchanged; once the room appears the initial load proceeds.
        post_n(tmp.path(), "general", 1, 0);
        match tailer.poll().unwrap() {
            Some(TailEvent::Reset { records }) => assert_eq!(records.len(), 1),
            other => panic!("expected Reset, got {other:?}"),
        }
    }
}
