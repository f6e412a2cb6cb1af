//! Week bucketing policy shared by throughput and forecast.
//!
//! Every timestamp is evaluated in UTC and assigned to the ISO 8601 week that
//! contains it. Weeks start on Monday. Both [`crate::metrics::compute_throughput`]
//! and [`crate::metrics::forecast`] go through [`week_of`], so week boundaries
//! never disagree between the historical series and its projection.

use chrono::{DateTime, NaiveDate, Utc, Weekday};

use crate::week::WeekKey;

/// First day of a bucketing week. ISO week labels assume Monday.
pub const WEEK_START: Weekday = Weekday::Mon;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Week label for a timestamp, evaluated in UTC.
pub fn week_of(ts: &DateTime<Utc>) -> WeekKey {
    WeekKey::containing(ts.date_naive())
}

/// First day (per [`WEEK_START`]) of the week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d.week(WEEK_START).first_day()
}

/// Elapsed fractional days from `start` to `end`. Negative spans clamp to 0.
pub fn days_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
    let millis = (*end - *start).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / MILLIS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 2, 9).unwrap();
        let start = week_start(sunday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_same_week_same_label() {
        // Monday 00:00 and Sunday 23:00 of the same ISO week
        let mon = utc(2025, 2, 3, 0);
        let sun = utc(2025, 2, 9, 23);
        assert_eq!(week_of(&mon), week_of(&sun));
        assert_eq!(week_of(&mon).to_key(), "2025-W06");
    }

    #[test]
    fn test_later_week_sorts_after() {
        let a = week_of(&utc(2025, 2, 9, 23));
        let b = week_of(&utc(2025, 2, 10, 0));
        assert!(a.to_key() < b.to_key());
        assert!(a < b);
    }

    #[test]
    fn test_iso_year_boundary() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025
        assert_eq!(week_of(&utc(2024, 12, 30, 12)).to_key(), "2025-W01");
        // 2021-01-03 is a Sunday in ISO week 53 of 2020
        assert_eq!(week_of(&utc(2021, 1, 3, 12)).to_key(), "2020-W53");
        assert!(week_of(&utc(2021, 1, 3, 12)).to_key() < week_of(&utc(2021, 1, 4, 0)).to_key());
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(&utc(2025, 1, 1, 0), &utc(2025, 1, 3, 0)), 2.0);
        assert_eq!(days_between(&utc(2025, 1, 1, 0), &utc(2025, 1, 1, 12)), 0.5);
    }

    #[test]
    fn test_days_between_negative_clamps() {
        assert_eq!(days_between(&utc(2025, 1, 3, 0), &utc(2025, 1, 1, 0)), 0.0);
    }
}
