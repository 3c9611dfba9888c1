//! Conversion from canonical timezone names to UTC offsets.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset of `canonical_timezone`, e.g. "Africa/Conakry".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get the UTC offset of `canonical_timezone`, logging and returning an error
/// if the name is not a known timezone.
pub fn local_offset_or_error(canonical_timezone: &str) -> Result<UtcOffset, crate::Error> {
    get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("could not get local time offset from timezone {canonical_timezone}");
        crate::Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })
}
