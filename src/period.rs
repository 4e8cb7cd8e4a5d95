//! Half-open calendar intervals.
//!
//! A [`Period`] covers the dates `start..end`: `start` is included, `end` is
//! not. Bounds are calendar dates, so any time-of-day is dropped when a period
//! is built from timestamps.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::matches_granularity;
use crate::error::{CadenceError, Result};
use crate::fields::Granularity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Build a period, rejecting `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let p = Period { start, end };
        if !p.is_valid() {
            return Err(CadenceError::InvalidPeriod { start, end });
        }
        Ok(p)
    }

    /// Build a period from timestamps, truncating both to midnight.
    pub fn from_datetimes(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        Period::new(start.date(), end.date())
    }

    /// Strictly `start < end`; zero-length periods are invalid.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open containment of a calendar date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Half-open containment of an instant: `start <= t < end` where the
    /// bounds stand for midnight of their dates.
    pub fn contains_instant(&self, t: NaiveDateTime) -> bool {
        self.contains(t.date())
    }

    /// Closed containment against `reference`: touching or equal bounds count
    /// as within. False if either period is invalid.
    pub fn is_within(&self, reference: &Period) -> bool {
        if !self.is_valid() || !reference.is_valid() {
            return false;
        }
        self.start >= reference.start && self.end <= reference.end
    }

    pub fn overlaps(&self, other: &Period) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length in whole days (negative for inverted periods).
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The last date inside the period.
    pub fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }

    /// Guess the granularity of this period.
    ///
    /// An exact canonical alignment wins; otherwise the length decides:
    /// up to 1 day is Day, 7 Week, 31 Month, 93 Quarter, anything longer Year.
    /// Invalid periods report Day.
    pub fn detect_granularity(&self) -> Granularity {
        if !self.is_valid() {
            return Granularity::Day;
        }
        for g in [
            Granularity::Day,
            Granularity::Week,
            Granularity::Month,
            Granularity::Quarter,
            Granularity::Year,
        ] {
            if matches_granularity(self, g) {
                return g;
            }
        }
        match self.num_days() {
            d if d <= 1 => Granularity::Day,
            d if d <= 7 => Granularity::Week,
            d if d <= 31 => Granularity::Month,
            d if d <= 93 => Granularity::Quarter,
            _ => Granularity::Year,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn p(a: NaiveDate, b: NaiveDate) -> Period {
        Period { start: a, end: b }
    }

    #[test]
    fn test_is_valid() {
        assert!(p(d(2025, 7, 16), d(2025, 7, 17)).is_valid());
        assert!(!p(d(2025, 7, 16), d(2025, 7, 16)).is_valid());
        assert!(!p(d(2025, 7, 17), d(2025, 7, 16)).is_valid());
    }

    #[test]
    fn test_new_rejects_zero_length() {
        assert!(Period::new(d(2025, 7, 16), d(2025, 7, 16)).is_err());
        assert!(Period::new(d(2025, 7, 16), d(2025, 7, 17)).is_ok());
    }

    #[test]
    fn test_from_datetimes_truncates_time_of_day() {
        let start = d(2025, 7, 16).and_hms_opt(13, 45, 0).unwrap();
        let end = d(2025, 7, 18).and_hms_opt(8, 0, 0).unwrap();
        let period = Period::from_datetimes(start, end).unwrap();
        assert_eq!(period, p(d(2025, 7, 16), d(2025, 7, 18)));
    }

    #[test]
    fn test_contains_is_half_open() {
        let period = p(d(2025, 7, 1), d(2025, 8, 1));
        assert!(period.contains(period.start));
        assert!(!period.contains(period.end));
        assert!(period.contains(d(2025, 7, 31)));
        assert!(!period.contains(d(2025, 6, 30)));

        let last_second = d(2025, 7, 31).and_hms_opt(23, 59, 59).unwrap();
        assert!(period.contains_instant(last_second));
        assert!(!period.contains_instant(d(2025, 8, 1).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn test_is_within_is_closed_at_both_ends() {
        let reference = p(d(2025, 7, 1), d(2025, 8, 1));
        let cases = [
            (p(d(2025, 7, 5), d(2025, 7, 10)), true),
            (reference, true),
            (p(d(2025, 7, 1), d(2025, 7, 10)), true),
            (p(d(2025, 7, 20), d(2025, 8, 1)), true),
            (p(d(2025, 6, 30), d(2025, 7, 10)), false),
            (p(d(2025, 7, 20), d(2025, 8, 2)), false),
            (p(d(2025, 9, 1), d(2025, 9, 2)), false),
            (p(d(2025, 7, 10), d(2025, 7, 5)), false),
        ];
        for (period, want) in cases {
            assert_eq!(period.is_within(&reference), want, "{period}");
        }
        let broken = p(d(2025, 8, 1), d(2025, 7, 1));
        assert!(!p(d(2025, 7, 5), d(2025, 7, 6)).is_within(&broken));
    }

    #[test]
    fn test_detect_granularity_exact_alignment() {
        assert_eq!(p(d(2025, 7, 16), d(2025, 7, 17)).detect_granularity(), Granularity::Day);
        assert_eq!(p(d(2025, 7, 14), d(2025, 7, 21)).detect_granularity(), Granularity::Week);
        assert_eq!(p(d(2025, 7, 1), d(2025, 8, 1)).detect_granularity(), Granularity::Month);
        assert_eq!(p(d(2025, 7, 1), d(2025, 10, 1)).detect_granularity(), Granularity::Quarter);
        assert_eq!(p(d(2025, 1, 1), d(2026, 1, 1)).detect_granularity(), Granularity::Year);
    }

    #[test]
    fn test_detect_granularity_falls_back_to_length() {
        assert_eq!(p(d(2025, 7, 16), d(2025, 7, 19)).detect_granularity(), Granularity::Week);
        assert_eq!(p(d(2025, 7, 16), d(2025, 7, 31)).detect_granularity(), Granularity::Month);
        assert_eq!(p(d(2025, 7, 16), d(2025, 9, 14)).detect_granularity(), Granularity::Quarter);
        assert_eq!(p(d(2025, 2, 3), d(2025, 8, 22)).detect_granularity(), Granularity::Year);
        assert_eq!(p(d(2025, 7, 17), d(2025, 7, 16)).detect_granularity(), Granularity::Day);
    }
}
