//! Wire schemas for records stored under the shared root.

pub mod message;
pub mod presence;

pub use message::{Attachment, AttachmentDisplay, MessageKind, MessageRecord};
pub use presence::PresenceEntry;
