//! Presence heartbeat schema.

use serde::{Deserialize, Serialize};

/// One liveness file per user under `presence/`, overwritten in place via
/// atomic rewrite. Liveness is derived from the freshness of `ts`; there is
/// no explicit leave event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    /// Friendly display name (unsanitized original).
    pub user: String,

    /// RFC 3339 instant of the last heartbeat, producer's clock.
    pub ts: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let entry = PresenceEntry {
            user: "Ada Lovelace".to_string(),
            ts: "2025-11-12T03:21:45.123Z".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"user":"Ada Lovelace","ts":"2025-11-12T03:21:45.123Z"}"#);
        let reparsed: PresenceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, entry);
    }
}
