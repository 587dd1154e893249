//! Resolving the server's configured timezone.
//!
//! Offsets are looked up for the instant being converted, so a date entered
//! in summer keeps its calendar day when it is shown in winter.

use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The canonical name of UTC, used for timestamps that carry no timezone.
pub const UTC_TIMEZONE: &str = "Etc/UTC";

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The calendar date of `date_time` in `canonical_timezone`.
///
/// Returns `None` if the name is not a known timezone.
pub fn to_local_date(date_time: OffsetDateTime, canonical_timezone: &str) -> Option<Date> {
    let tz = time_tz::timezones::get_by_name(canonical_timezone)?;
    let offset = tz.get_offset_utc(&date_time).to_utc();

    Some(date_time.to_offset(offset).date())
}

/// Read the wall-clock time `date_time` as a time in `canonical_timezone`.
///
/// Returns `None` if the name is not a known timezone.
pub fn assume_local(
    date_time: PrimitiveDateTime,
    canonical_timezone: &str,
) -> Option<OffsetDateTime> {
    let tz = time_tz::timezones::get_by_name(canonical_timezone)?;
    // The offset depends on the instant, which depends on the offset. Start
    // from the wall time read as UTC and correct once.
    let estimate = tz.get_offset_utc(&date_time.assume_utc()).to_utc();
    let offset = tz
        .get_offset_utc(&date_time.assume_offset(estimate))
        .to_utc();

    Some(date_time.assume_offset(offset))
}
