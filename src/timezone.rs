//! Resolves "today" in the server's configured timezone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone name.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get today's date in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone name.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::{Error, timezone::local_today};

    use super::get_local_offset;

    #[test]
    fn utc_has_zero_offset() {
        let offset = get_local_offset("Etc/UTC").expect("Etc/UTC should be a known timezone");

        assert!(offset.is_utc());
    }

    #[test]
    fn unknown_timezone_is_none() {
        assert_eq!(get_local_offset("Not/AZone"), None);
    }

    #[test]
    fn local_today_in_utc_matches_utc_date() {
        let today = local_today("Etc/UTC").unwrap();

        // Allow for the test straddling midnight.
        let now = OffsetDateTime::now_utc().date();
        assert!(today == now || today.next_day() == Some(now));
    }

    #[test]
    fn local_today_fails_on_unknown_timezone() {
        assert_eq!(
            local_today("Not/AZone"),
            Err(Error::InvalidTimezone("Not/AZone".to_owned()))
        );
    }
}
