//! Message record schema.
//!
//! One record per file under `rooms/<room>/msgs/`, serialized as a single
//! JSON line with camelCase keys. Records are immutable once written; readers
//! either see the whole record (post-rename) or nothing (pre-rename).

use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// Field declaration order is the wire key order. `reply_to` serializes as
/// an explicit `"replyTo":null` when absent so every record carries the same
/// key set. Unknown keys from newer writers are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Opaque short token, unique within a room with overwhelming probability.
    pub id: String,

    /// RFC 3339 instant with millisecond precision, producer's clock.
    /// Advisory: affects compaction bucketing, never delivery order.
    pub ts: String,

    /// Room key the record belongs to.
    pub room: String,

    /// Sender display name.
    pub from: String,

    /// Record discriminator.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// UTF-8 body, non-empty after trimming.
    pub text: String,

    /// Id of the record this one replies to, if any.
    #[serde(default)]
    pub reply_to: Option<String>,

    /// Ordered attachment references.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Message discriminator. A single variant today; kept as an enum so new
/// record kinds deserialize as parse failures rather than silent text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Msg,
}

/// Reference to an attachment payload under the room's `attachments/` tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Path relative to the room's attachments directory, `/`-separated.
    pub rel_path: String,

    /// MIME type of the payload.
    pub mime: String,

    /// How consumers should present the attachment.
    pub display: AttachmentDisplay,
}

/// Presentation hint for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentDisplay {
    Inline,
    Link,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_documented_key_order() {
        let record = MessageRecord {
            id: "a1b2c3d4".to_string(),
            ts: "2025-11-12T03:21:45.123Z".to_string(),
            room: "general".to_string(),
            from: "alice".to_string(),
            kind: MessageKind::Msg,
            text: "hello".to_string(),
            reply_to: None,
            attachments: Vec::new(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":"a1b2c3d4","ts":"2025-11-12T03:21:45.123Z","room":"general","from":"alice","type":"msg","text":"hello","replyTo":null,"attachments":[]}"#
        );
    }

    #[test]
    fn round_trips_reply_and_attachments() {
        let record = MessageRecord {
            id: "deadbeef".to_string(),
            ts: "2025-11-12T03:22:00.000Z".to_string(),
            room: "general".to_string(),
            from: "bob".to_string(),
            kind: MessageKind::Msg,
            text: "see diagram".to_string(),
            reply_to: Some("a1b2c3d4".to_string()),
            attachments: vec![Attachment {
                rel_path: "diagrams/flow.png".to_string(),
                mime: "image/png".to_string(),
                display: AttachmentDisplay::Inline,
            }],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""replyTo":"a1b2c3d4""#));
        assert!(json.contains(r#""relPath":"diagrams/flow.png""#));
        assert!(json.contains(r#""display":"inline""#));

        let reparsed: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn parses_minimal_record_without_optional_keys() {
        let json = r#"{"id":"x","ts":"2025-11-12T03:21:45.123Z","room":"general","from":"alice","type":"msg","text":"hi"}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.reply_to, None);
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn ignores_unknown_keys_from_newer_writers() {
        let json = r#"{"id":"x","ts":"2025-11-12T03:21:45.123Z","room":"general","from":"alice","type":"msg","text":"hi","replyTo":null,"attachments":[],"futureField":42}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.text, "hi");
    }

    #[test]
    fn unknown_type_discriminator_is_a_parse_failure() {
        let json = r#"{"id":"x","ts":"2025-11-12T03:21:45.123Z","room":"general","from":"alice","type":"system","text":"hi"}"#;
        assert!(serde_json::from_str::<MessageRecord>(json).is_err());
    }
}
