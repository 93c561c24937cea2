//! Time helpers.
//!
//! All instants are naive UTC. Date-only values (due dates, validity dates)
//! are promoted to midnight so they compare against a `now` snapshot the same
//! way a browser compares `new Date("2024-01-15")` against `new Date()`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Current wall-clock time as naive UTC.
///
/// The engine never calls this itself; callers take one snapshot per pass and
/// hand it down.
#[must_use]
pub fn now_utc() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Promote a calendar date to the instant it starts.
#[must_use]
pub const fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    NaiveDateTime::new(date, NaiveTime::MIN)
}

/// Last representable instant of a calendar date.
#[must_use]
pub const fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    NaiveDateTime::new(date, LAST_NANO)
}

const LAST_NANO: NaiveTime = match NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Parse the upper end of an inclusive window.
///
/// A bare date covers the whole day and resolves to [`end_of_day`]. Anything
/// else parses like [`parse_instant`].
pub fn parse_upper_bound(value: &str) -> Result<NaiveDateTime> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(end_of_day(date)),
        Err(_) => parse_instant(value),
    }
}

/// Parse a user-supplied instant.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]`, the same with a space
/// separator, and RFC 3339 with an offset (converted to UTC).
pub fn parse_instant(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc())
        .map_err(|_| Error::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_is_midnight() {
        let parsed = parse_instant("2024-06-01").unwrap();
        assert_eq!(parsed.to_string(), "2024-06-01 00:00:00");
    }

    #[test]
    fn datetime_variants_parse() {
        assert_eq!(
            parse_instant("2024-06-01T12:30:00").unwrap().to_string(),
            "2024-06-01 12:30:00"
        );
        assert_eq!(
            parse_instant(" 2024-06-01 12:30:00.250 ").unwrap().to_string(),
            "2024-06-01 12:30:00.250"
        );
    }

    #[test]
    fn rfc3339_offset_is_normalized_to_utc() {
        let parsed = parse_instant("2024-06-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed.to_string(), "2024-06-01 10:00:00");
    }

    #[test]
    fn bare_upper_bound_covers_the_whole_day() {
        let bound = parse_upper_bound("2024-01-31").unwrap();
        assert!(parse_instant("2024-01-31T23:59:59.999").unwrap() <= bound);
        assert!(parse_instant("2024-02-01").unwrap() > bound);
        assert_eq!(
            parse_upper_bound("2024-01-31T12:00:00").unwrap(),
            parse_instant("2024-01-31T12:00:00").unwrap()
        );
        assert!(parse_upper_bound("soon").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_instant("next tuesday").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(ref v) if v == "next tuesday"));
    }
}
