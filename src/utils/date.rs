//! Timestamp formatting.
//!
//! The output zone is always passed in explicitly, there is no process-wide
//! time zone.

use crate::content::Timestamp;
use chrono::{FixedOffset, SecondsFormat};

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS` plus zone suffix.
///
/// A zero offset renders as `Z`, anything else as `+HH:MM`. Raw strings are
/// already formatted and come back untouched.
pub fn format_timestamp(timestamp: &Timestamp, offset: &FixedOffset) -> String {
    match timestamp {
        Timestamp::At(at) => at.with_timezone(offset).to_rfc3339_opts(SecondsFormat::Secs, true),
        Timestamp::Raw(raw) => raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(s: &str) -> Timestamp {
        Timestamp::At(DateTime::parse_from_rfc3339(s).unwrap())
    }

    #[test]
    fn test_utc_formatting() {
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(format_timestamp(&at("2023-05-01T14:00:00+02:00"), &utc), "2023-05-01T12:00:00Z");
        assert_eq!(format_timestamp(&at("2023-05-01T12:00:00.750Z"), &utc), "2023-05-01T12:00:00Z");
    }

    #[test]
    fn test_offset_formatting() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(format_timestamp(&at("2023-05-01T20:00:00Z"), &tokyo), "2023-05-02T05:00:00+09:00");
    }

    #[test]
    fn test_raw_passthrough() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let raw = Timestamp::Raw("May 1st, 2023".into());

        assert_eq!(format_timestamp(&raw, &utc), "May 1st, 2023");
    }
}
