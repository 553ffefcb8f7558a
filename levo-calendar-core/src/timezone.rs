//! Time zone shifting for newly created events.
//!
//! The user types a wall-clock time that is read in the local zone. When a
//! different display zone is chosen, the instant is shifted so that the
//! same wall-clock time holds in that zone instead.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CalResult, CalendarError};

/// Parse an IANA zone name such as `Europe/Helsinki`.
pub fn parse_zone(name: &str) -> CalResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(name.to_string()))
}

/// The machine's zone, or UTC when it cannot be determined.
pub fn local_zone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

/// Shift `date` from the local zone into `zone`.
pub fn change_timezone(date: DateTime<Utc>, zone: Tz) -> DateTime<Utc> {
    change_timezone_between(date, local_zone(), zone)
}

/// Shift `date` so that its wall-clock reading in `from` becomes the same
/// wall-clock reading in `to`. Offsets are sampled at `date`.
pub fn change_timezone_between(date: DateTime<Utc>, from: Tz, to: Tz) -> DateTime<Utc> {
    date + (offset_at(from, date) - offset_at(to, date))
}

fn offset_at(zone: Tz, date: DateTime<Utc>) -> chrono::Duration {
    let seconds = zone.offset_from_utc_datetime(&date.naive_utc()).fix().local_minus_utc();
    chrono::Duration::seconds(i64::from(seconds))
}
