//! Text validation and sanitization for message and user input.

/// Default maximum message size in bytes (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1_048_576;

/// Validate message text before it is written to the spool.
///
/// Returns `Err` with a user-facing message when:
/// - `text` is empty after trimming whitespace
/// - `text` contains null bytes (`\0`) — these corrupt JSON files
/// - `text.len()` (in bytes) exceeds `max_bytes`
///
/// # Errors
///
/// Returns `Err(String)` with a human-readable message on validation failure.
pub fn validate_message_text(text: &str, max_bytes: usize) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Message text is empty".to_string());
    }
    if text.contains('\0') {
        return Err(
            "Message contains null bytes (\\0) which are not allowed. \
             Remove null bytes and retry."
                .to_string(),
        );
    }
    if text.len() > max_bytes {
        return Err(format!(
            "Message size ({} bytes) exceeds maximum allowed ({} bytes).",
            text.len(),
            max_bytes,
        ));
    }
    Ok(())
}

/// Reduce a user or room name to a file-system-safe token.
///
/// Keeps ASCII alphanumerics plus `.`, `_`, and `-`; everything else is
/// dropped. An empty result means the input cannot name a file and the
/// caller must reject it.
pub fn sanitize_token(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}
