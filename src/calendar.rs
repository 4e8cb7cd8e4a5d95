//! Granularity calendar: canonical periods, textual references and labels.
//!
//! Two week conventions live side by side here and are kept apart on purpose:
//!
//! - [`IsoWeekCanonicalizer`] starts weeks on Monday. Canonical week periods
//!   and `YYYY-Wnn` references use it.
//! - [`SundayWeekLabeler`] buckets days Sunday to Saturday. Week labels in
//!   [`generate_labels`] (and therefore rollup groups) use it.
//!
//! Reference formats accepted by [`parse_reference`]:
//!
//! | Granularity | Format        | Example      |
//! |-------------|---------------|--------------|
//! | Year        | `YYYY`        | `2024`       |
//! | Quarter     | `YYYY-Q[1-4]` | `2024-Q4`    |
//! | Month       | `YYYY-MM`     | `2025-07`    |
//! | Week        | `YYYY-W[1-53]`| `2025-W15`   |
//! | Day         | `YYYY-MM-DD`  | `2025-07-15` |

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::error::{CadenceError, Result};
use crate::fields::Granularity;
use crate::period::Period;

/// Monday-start weeks.
pub struct IsoWeekCanonicalizer;

impl IsoWeekCanonicalizer {
    /// The Monday on or before `date`.
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        // Monday = 1 .. Sunday = 7, so the offset is never positive.
        let offset = 1 - date.weekday().number_from_monday() as i64;
        date + Duration::days(offset)
    }

    /// The `week`-th Monday-aligned week counted from the week holding Jan 1.
    pub fn nth_week(year: i32, week: u32) -> Result<Period> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| CadenceError::format(&year.to_string(), "year out of range"))?;
        let start = Self::week_start(jan1) + Duration::weeks(i64::from(week) - 1);
        Ok(Period {
            start,
            end: start + Duration::days(7),
        })
    }
}

/// Sunday-to-Saturday label buckets.
pub struct SundayWeekLabeler;

impl SundayWeekLabeler {
    /// The Sunday on or before `date`.
    pub fn bucket_start(date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
    }

    /// `YYYY-MM-DD~YYYY-MM-DD`, both ends inclusive.
    pub fn label(first: NaiveDate, last: NaiveDate) -> String {
        format!("{}~{}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
    }

    /// Parse a bucket label back into the half-open period it covers.
    pub fn parse(label: &str) -> Result<Period> {
        let (a, b) = label
            .split_once('~')
            .ok_or_else(|| CadenceError::format(label, "expected YYYY-MM-DD~YYYY-MM-DD"))?;
        let first = parse_day(a.trim())?;
        let last = parse_day(b.trim())?;
        let period = Period {
            start: first,
            end: last + Duration::days(1),
        };
        if !period.is_valid() {
            return Err(CadenceError::format(label, "week label ends before it starts"));
        }
        Ok(period)
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// The canonical period of granularity `g` that contains `date`.
pub fn canonical_period(g: Granularity, date: NaiveDate) -> Period {
    match g {
        Granularity::Day => Period {
            start: date,
            end: date.succ_opt().unwrap_or(NaiveDate::MAX),
        },
        Granularity::Week => {
            let start = IsoWeekCanonicalizer::week_start(date);
            Period {
                start,
                end: start + Duration::days(7),
            }
        }
        Granularity::Month => {
            let start = first_of_month(date);
            Period {
                start,
                end: add_months(start, 1),
            }
        }
        Granularity::Quarter => {
            let month = (quarter_of(date) - 1) * 3 + 1;
            let start = NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date);
            Period {
                start,
                end: add_months(start, 3),
            }
        }
        Granularity::Year => {
            let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            Period {
                start,
                end: add_months(start, 12),
            }
        }
    }
}

/// True iff `p` is exactly the canonical `g` period of its own start date.
pub fn matches_granularity(p: &Period, g: Granularity) -> bool {
    canonical_period(g, p.start) == *p
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_year(input: &str, s: &str) -> Result<i32> {
    if !is_digits(s, 4) {
        return Err(CadenceError::format(input, "year must be four digits"));
    }
    s.parse()
        .map_err(|_| CadenceError::format(input, "year must be four digits"))
}

fn parse_month(input: &str, s: &str) -> Result<u32> {
    if !is_digits(s, 2) {
        return Err(CadenceError::format(input, "month must be two digits"));
    }
    let month: u32 = s
        .parse()
        .map_err(|_| CadenceError::format(input, "month must be two digits"))?;
    if !(1..=12).contains(&month) {
        return Err(CadenceError::format(input, format!("month {month} out of range 1-12")));
    }
    Ok(month)
}

fn parse_day(input: &str) -> Result<NaiveDate> {
    let mut parts = input.splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CadenceError::format(input, "expected YYYY-MM-DD"));
    };
    let year = parse_year(input, y)?;
    let month = parse_month(input, m)?;
    if !is_digits(d, 2) {
        return Err(CadenceError::format(input, "day must be two digits"));
    }
    let day: u32 = d
        .parse()
        .map_err(|_| CadenceError::format(input, "day must be two digits"))?;
    if !(1..=31).contains(&day) {
        return Err(CadenceError::format(input, format!("day {day} out of range 1-31")));
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CadenceError::format(input, format!("day {day} does not exist in {year}-{month:02}"))
    })
}

/// Parse a textual reference such as `2024-Q4` into the period it names.
pub fn parse_reference(reference: &str, g: Granularity) -> Result<Period> {
    let input = reference.trim();
    match g {
        Granularity::Year => {
            let year = parse_year(input, input)?;
            Ok(canonical_period(Granularity::Year, year_start(input, year)?))
        }
        Granularity::Quarter => {
            let (y, q) = input
                .split_once("-Q")
                .ok_or_else(|| CadenceError::format(input, "expected YYYY-QN"))?;
            let year = parse_year(input, y)?;
            if !is_digits(q, 1) {
                return Err(CadenceError::format(input, "expected YYYY-QN"));
            }
            let quarter: u32 = q
                .parse()
                .map_err(|_| CadenceError::format(input, "expected YYYY-QN"))?;
            if !(1..=4).contains(&quarter) {
                return Err(CadenceError::format(input, format!("quarter {quarter} out of range 1-4")));
            }
            let start = NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
                .ok_or_else(|| CadenceError::format(input, "year out of range"))?;
            Ok(canonical_period(Granularity::Quarter, start))
        }
        Granularity::Month => {
            let (y, m) = input
                .split_once('-')
                .ok_or_else(|| CadenceError::format(input, "expected YYYY-MM"))?;
            let year = parse_year(input, y)?;
            let month = parse_month(input, m)?;
            let start = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| CadenceError::format(input, "year out of range"))?;
            Ok(canonical_period(Granularity::Month, start))
        }
        Granularity::Week => {
            let (y, w) = input
                .split_once("-W")
                .ok_or_else(|| CadenceError::format(input, "expected YYYY-WN"))?;
            let year = parse_year(input, y)?;
            if !(is_digits(w, 1) || is_digits(w, 2)) {
                return Err(CadenceError::format(input, "expected YYYY-WN"));
            }
            let week: u32 = w
                .parse()
                .map_err(|_| CadenceError::format(input, "expected YYYY-WN"))?;
            if !(1..=53).contains(&week) {
                return Err(CadenceError::format(input, format!("week {week} out of range 1-53")));
            }
            IsoWeekCanonicalizer::nth_week(year, week)
        }
        Granularity::Day => Ok(canonical_period(Granularity::Day, parse_day(input)?)),
    }
}

fn year_start(input: &str, year: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| CadenceError::format(input, "year out of range"))
}

/// Parse a label produced by [`generate_labels`] (or a plain reference).
///
/// Week labels use the Sunday bucket form; `YYYY-Wnn` is accepted as well.
pub fn parse_label(label: &str, g: Granularity) -> Result<Period> {
    if g == Granularity::Week && label.contains('~') {
        return SundayWeekLabeler::parse(label.trim());
    }
    parse_reference(label, g)
}

/// Walk `p` in steps of `g`, emitting one label per step.
///
/// The walk starts at `p.start` and stops at `p.end` as given; it does not
/// snap `p` to canonical boundaries first. Invalid periods yield no labels.
pub fn generate_labels(p: &Period, g: Granularity) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = p.start;
    while current < p.end {
        match g {
            Granularity::Day => {
                labels.push(current.format("%Y-%m-%d").to_string());
                match current.succ_opt() {
                    Some(next) => current = next,
                    None => break,
                }
            }
            Granularity::Week => {
                let first = SundayWeekLabeler::bucket_start(current);
                let mut last = first + Duration::days(6);
                if last >= p.end {
                    last = p.last_day();
                }
                labels.push(SundayWeekLabeler::label(first, last));
                current = last + Duration::days(1);
            }
            Granularity::Month => {
                labels.push(current.format("%Y-%m").to_string());
                current = add_months(current, 1);
            }
            Granularity::Quarter => {
                labels.push(format!("{}-Q{}", current.year(), quarter_of(current)));
                current = add_months(current, 3);
            }
            Granularity::Year => {
                labels.push(current.format("%Y").to_string());
                current = add_months(current, 12);
            }
        }
    }
    labels
}
