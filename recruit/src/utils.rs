//! Time formatting helpers.

use chrono::{DateTime, FixedOffset, Utc};

/// Format used for `created`/`updated` on recruit records.
pub const BOARD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render an instant as board local time with minute precision.
///
/// The offset is fixed (no daylight saving). An offset outside ±23 hours is
/// treated as UTC.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use guildhack_recruit::utils::format_board_timestamp;
///
/// let instant = Utc.with_ymd_and_hms(2025, 1, 1, 15, 30, 59).unwrap();
/// assert_eq!(format_board_timestamp(instant, 9), "2025-01-02 00:30");
/// ```
#[must_use]
pub fn format_board_timestamp(now: DateTime<Utc>, offset_hours: i32) -> String {
    FixedOffset::east_opt(offset_hours.saturating_mul(3600))
        .map_or_else(
            || now.naive_utc(),
            |offset| now.with_timezone(&offset).naive_local(),
        )
        .format(BOARD_TIMESTAMP_FORMAT)
        .to_string()
}
