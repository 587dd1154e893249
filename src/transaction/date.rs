//! Lenient parsing of transaction dates.
//!
//! Dates come from HTML date inputs, from older rows in the hosted backend and
//! from hand-written API requests, so they arrive in a handful of shapes and
//! are sometimes not dates at all. A date that cannot be parsed is never an
//! error for the user: it is logged and replaced with the current time, so a
//! malformed date can never block adding, editing or loading a transaction.
//!
//! Dates and times without an offset are read in the server's local timezone,
//! the same timezone the dashboard shows dates in.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::timezone::assume_local;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const DATE_TIME_SECONDS_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// A date string that did not match any of the accepted formats.
///
/// This error does not leave this module through [parse_date_or_now].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse \"{0}\" as a date")]
pub struct DateParseError(pub String);

/// Parse `text` as a timestamp.
///
/// Accepted formats, tried in order:
/// - RFC 3339, e.g. "2024-01-01T09:30:00+13:00"
/// - a date and time without an offset, e.g. "2024-01-01T09:30", taken as a
///   time in `local_timezone`
/// - a calendar date, e.g. "2024-01-01", taken as midnight in `local_timezone`
///
/// `local_timezone` is a canonical timezone name, e.g. "Pacific/Auckland".
/// An unknown name is logged and treated as UTC.
///
/// # Errors
/// Returns a [DateParseError] if `text` matches none of the formats.
pub fn parse_date(text: &str, local_timezone: &str) -> Result<OffsetDateTime, DateParseError> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time);
    }

    for format in [DATE_TIME_SECONDS_FORMAT, DATE_TIME_FORMAT] {
        if let Ok(date_time) = PrimitiveDateTime::parse(text, format) {
            return Ok(assume_local_or_utc(date_time, local_timezone));
        }
    }

    Date::parse(text, DATE_FORMAT)
        .map(|date| assume_local_or_utc(date.midnight(), local_timezone))
        .map_err(|_| DateParseError(text.to_owned()))
}

fn assume_local_or_utc(date_time: PrimitiveDateTime, local_timezone: &str) -> OffsetDateTime {
    assume_local(date_time, local_timezone).unwrap_or_else(|| {
        tracing::warn!("Unknown timezone \"{local_timezone}\", reading {date_time} as UTC");
        date_time.assume_utc()
    })
}

/// Parse `text` as a timestamp, substituting `now` if it is malformed.
///
/// See [parse_date] for the accepted formats. The parse error is logged at
/// the warn level.
pub fn parse_date_or_now(text: &str, local_timezone: &str, now: OffsetDateTime) -> OffsetDateTime {
    parse_date(text, local_timezone).unwrap_or_else(|error| {
        tracing::warn!("{error}, using the current time {now} instead");
        now
    })
}
