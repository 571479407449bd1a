//! Core library for dropchat: serverless chat over a shared network folder.
//!
//! Multiple independent clients exchange near-real-time messages and presence
//! through nothing but a shared (possibly slow or intermittently unavailable)
//! file system. There is no server process and no persistent connection; all
//! correctness guarantees rest on primitive file-system operations:
//!
//! - **Atomic record writes**: temp-file-then-rename, one message per file
//! - **Lexicographic ordering**: record file names sort chronologically
//! - **Cursor polling**: a directory becomes a pollable event stream
//! - **TTL presence**: liveness derived from heartbeat freshness
//! - **Lock-protected compaction**: the spool folds into daily NDJSON logs

pub mod compactor;
pub mod io;
pub mod layout;
pub mod logging;
pub mod naming;
pub mod presence;
pub mod schema;
pub mod spool;
pub mod tailer;
pub mod text;

pub use compactor::{compact, CompactionSummary, CutoffPolicy};
pub use io::StoreError;
pub use schema::{Attachment, AttachmentDisplay, MessageKind, MessageRecord, PresenceEntry};
pub use spool::{post, post_at};
pub use tailer::{TailEvent, Tailer};
