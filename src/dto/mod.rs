//! Request and response payloads of the REST API.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod game;
pub mod health;
pub mod roster;
pub mod teams;
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Parse an RFC 3339 timestamp such as `2026-05-02T18:30:00+02:00`.
pub fn parse_timestamp(value: &str) -> Option<SystemTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339)
        .ok()
        .map(SystemTime::from)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn timestamps_round_trip_through_utc() {
        let parsed = parse_timestamp("2026-05-02T18:30:00+02:00").unwrap();
        assert_eq!(format_system_time(parsed), "2026-05-02T16:30:00Z");
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        assert!(parse_timestamp("tomorrow at six").is_none());
        assert!(parse_timestamp("2026-05-02 18:30").is_none());
        assert_eq!(
            parse_timestamp("1970-01-01T00:00:10Z"),
            Some(UNIX_EPOCH + Duration::from_secs(10))
        );
    }
}
