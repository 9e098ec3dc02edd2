//! Timestamp helpers.

use chrono::Utc;

/// Current server time as an RFC 3339 Zulu string, second precision.
/// This is the format handed to chargers and to the telemetry tables.
pub fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zulu_format() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
