//! Record file naming: lexicographic order equals chronological order.
//!
//! A record file name encodes `(timestamp to the millisecond, random token)`
//! as `YYYY-MM-DDTHH-MM-SS-sssZ_<8-hex>.json`. The timestamp component is
//! fixed-width and colon-free, so names stay file-system-legal and plain
//! string comparison orders them chronologically, tie-broken by token. This
//! whole-string order is the system's only ordering oracle; the `ts` field
//! inside a record is advisory.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

/// File extension for message and presence records.
pub const RECORD_EXT: &str = ".json";

// Fixed-width, colon-free; `%3f` keeps millisecond resolution.
const NAME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Generate an 8-hex-char random token (4 bytes of entropy).
///
/// Tokens tie-break records that share a millisecond and make name
/// collisions negligible; a collision surfaces as
/// [`StoreError::NameCollision`](crate::StoreError::NameCollision) and the
/// caller retries with a fresh token.
pub fn random_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Build the record file name for `ts` and `token`.
pub fn record_file_name(ts: DateTime<Utc>, token: &str) -> String {
    format!("{}_{}{}", ts.format(NAME_FORMAT), token, RECORD_EXT)
}

/// Recover the encoded instant from a record file name.
///
/// Returns `None` for names this system did not produce.
pub fn decode_record_name(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(RECORD_EXT)?;
    let (ts_part, _token) = stem.rsplit_once('_')?;
    let naive = NaiveDateTime::parse_from_str(ts_part, NAME_FORMAT).ok()?;
    Some(naive.and_utc())
}

/// Truncate `ts` to millisecond precision.
///
/// Record timestamps and file names both carry milliseconds; truncating at
/// the source keeps the name and the embedded `ts` in the same millisecond.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn name_matches_documented_format() {
        let ts = instant("2025-11-12T03:21:45.123Z");
        let name = record_file_name(ts, "a1b2c3d4");
        assert_eq!(name, "2025-11-12T03-21-45-123Z_a1b2c3d4.json");
    }

    #[test]
    fn decode_round_trips_to_the_millisecond() {
        let ts = instant("2025-11-12T03:21:45.123Z");
        let name = record_file_name(ts, "deadbeef");
        assert_eq!(decode_record_name(&name), Some(ts));
    }

    #[test]
    fn decode_rejects_foreign_names() {
        assert!(decode_record_name("notes.txt").is_none());
        assert!(decode_record_name("2025-11-12.json").is_none());
        assert!(decode_record_name("garbage_abcd1234.json").is_none());
    }

    #[test]
    fn names_sort_chronologically() {
        let a = record_file_name(instant("2025-11-12T03:21:45.123Z"), "ffffffff");
        let b = record_file_name(instant("2025-11-12T03:21:45.124Z"), "00000000");
        let c = record_file_name(instant("2025-11-12T03:21:46.000Z"), "00000000");
        assert!(a < b, "{a} should sort before {b}");
        assert!(b < c, "{b} should sort before {c}");
    }

    #[test]
    fn token_tie_breaks_equal_instants() {
        let ts = instant("2025-11-12T03:21:45.123Z");
        let a = record_file_name(ts, "0a0a0a0a");
        let b = record_file_name(ts, "0b0b0b0b");
        assert!(a < b);
    }

    #[test]
    fn random_token_is_eight_hex_chars() {
        let token = random_token();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn random_tokens_differ() {
        assert_ne!(random_token(), random_token());
    }

    #[test]
    fn truncate_drops_sub_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 12, 3, 21, 45).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let truncated = truncate_to_millis(ts);
        assert_eq!(truncated.timestamp_subsec_millis(), 123);
        assert_eq!(truncated.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
