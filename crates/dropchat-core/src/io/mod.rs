//! Atomic file I/O primitives for the shared chat root.
//!
//! Everything above this module is built on three primitives that stay
//! correct on weakly-consistent network file systems:
//!
//! - **Atomic record writes**: serialize to a uniquely-named temp file in the
//!   target directory, then rename — readers never observe partial content
//! - **Snapshot listings**: full re-read of a directory per call, sorted
//!   lexicographically, with tail/since cursor queries
//! - **TTL lock files**: create-exclusive acquisition with a JSON metadata
//!   body and bounded stale-lock takeover

pub mod atomic;
pub mod error;
pub mod listing;
pub mod lock;

pub use error::StoreError;
pub use lock::{with_lock, LockMetadata};
