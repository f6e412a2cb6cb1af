use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date_util::week_start;
use crate::error::{Error, Result};

static RE_WEEK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").unwrap());

/// Monday of `0001-W01`.
const FIRST_MONDAY: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(d) => d,
    None => panic!("0001-01-01 is out of range"),
};

/// Monday of `9999-W52`, the last four-digit ISO week.
const LAST_MONDAY: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 27) {
    Some(d) => d,
    None => panic!("9999-12-27 is out of range"),
};

/// An ISO 8601 calendar week, labelled `YYYY-Www`.
///
/// Stored as the Monday that starts the week, so ordering is chronological and
/// every value is a valid week by construction. ISO years are limited to
/// 0001..=9999 so labels always have four-digit years and sort lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub const MIN: WeekKey = WeekKey(FIRST_MONDAY);
    pub const MAX: WeekKey = WeekKey(LAST_MONDAY);

    /// The week containing `d`. Dates outside the supported years clamp to
    /// [`WeekKey::MIN`] or [`WeekKey::MAX`].
    pub fn containing(d: NaiveDate) -> Self {
        if d < FIRST_MONDAY {
            Self::MIN
        } else if d >= LAST_MONDAY {
            Self::MAX
        } else {
            WeekKey(week_start(d))
        }
    }

    /// Build from an ISO year and week number.
    pub fn new(year: i32, week: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            return Err(Error::WeekParse(format!("year {year} is out of range")));
        }
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .map(WeekKey)
            .ok_or_else(|| Error::WeekParse(format!("{year}-W{week:02} does not exist")))
    }

    /// Parse a week label.
    ///
    /// Supported formats:
    /// - `2025-W05`
    /// - `2025-W5`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let caps = RE_WEEK
            .captures(s)
            .ok_or_else(|| Error::WeekParse(format!("unrecognized week: {s}")))?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| Error::WeekParse(format!("invalid year: {s}")))?;
        let week: u32 = caps[2]
            .parse()
            .map_err(|_| Error::WeekParse(format!("invalid week: {s}")))?;
        Self::new(year, week)
    }

    pub fn iso_year(&self) -> i32 {
        self.0.iso_week().year()
    }

    pub fn iso_week(&self) -> u32 {
        self.0.iso_week().week()
    }

    /// Canonical label, lexically sortable.
    pub fn to_key(&self) -> String {
        format!("{:04}-W{:02}", self.iso_year(), self.iso_week())
    }

    /// Monday of this week.
    pub fn monday(&self) -> NaiveDate {
        self.0
    }

    /// Inclusive (Monday, Sunday) range.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.0, self.0 + Duration::days(6))
    }

    /// The following week, or `None` after [`WeekKey::MAX`].
    pub fn next(&self) -> Option<Self> {
        if *self >= Self::MAX {
            return None;
        }
        self.0.checked_add_signed(Duration::days(7)).map(WeekKey)
    }

    /// The preceding week, or `None` before [`WeekKey::MIN`].
    pub fn previous(&self) -> Option<Self> {
        if *self <= Self::MIN {
            return None;
        }
        self.0.checked_sub_signed(Duration::days(7)).map(WeekKey)
    }

    /// Signed number of weeks from `self` to `other`.
    pub fn weeks_until(&self, other: &WeekKey) -> i64 {
        (other.0 - self.0).num_days() / 7
    }
}

impl std::fmt::Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

impl std::str::FromStr for WeekKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_key())
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        WeekKey::parse(&s).map_err(serde::de::Error::custom)
    }
}
