//! Terminal rendering of message records.

use dropchat_core::{AttachmentDisplay, MessageRecord};

/// One message as printed by `tail` and `watch`.
pub fn format_record(record: &MessageRecord) -> String {
    let mut line = format!("[{}] {}: {}", record.ts, record.from, record.text);
    if let Some(reply_to) = &record.reply_to {
        line.push_str(&format!("  (reply to {reply_to})"));
    }
    for attachment in &record.attachments {
        let marker = match attachment.display {
            AttachmentDisplay::Inline => "inline",
            AttachmentDisplay::Link => "link",
        };
        line.push_str(&format!(
            "\n    attachment: {} ({}, {marker})",
            attachment.rel_path, attachment.mime
        ));
    }
    line
}
