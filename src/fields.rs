//! Enumerations and field types for tasks and journal entries.
//!
//! This module defines the calendar granularities that structure the task
//! hierarchy, along with task status and journal entry types.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, Result};

/// Calendar granularity of a task, a journal entry or a statistics bucket.
///
/// Variants are declared finest first, so the derived ordering reads
/// `Day < Week < Month < Quarter < Year`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    #[serde(alias = "Day")]
    Day,
    #[serde(alias = "Week")]
    Week,
    #[serde(alias = "Month")]
    Month,
    #[serde(alias = "Quarter")]
    Quarter,
    #[serde(alias = "Year")]
    Year,
}

impl Granularity {
    /// All granularities, coarsest first.
    pub const ALL: [Granularity; 5] = [
        Granularity::Year,
        Granularity::Quarter,
        Granularity::Month,
        Granularity::Week,
        Granularity::Day,
    ];

    /// Parse a scale name case-insensitively (`day|week|month|quarter|year`).
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "quarter" => Ok(Granularity::Quarter),
            "year" => Ok(Granularity::Year),
            _ => Err(CadenceError::format(
                s,
                "unsupported scale, expected day|week|month|quarter|year",
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// The next coarser granularity, `None` for `Year`.
    pub fn coarser(self) -> Option<Self> {
        match self {
            Granularity::Day => Some(Granularity::Week),
            Granularity::Week => Some(Granularity::Month),
            Granularity::Month => Some(Granularity::Quarter),
            Granularity::Quarter => Some(Granularity::Year),
            Granularity::Year => None,
        }
    }

    /// The next finer granularity, `None` for `Day`.
    pub fn finer(self) -> Option<Self> {
        match self {
            Granularity::Day => None,
            Granularity::Week => Some(Granularity::Day),
            Granularity::Month => Some(Granularity::Week),
            Granularity::Quarter => Some(Granularity::Month),
            Granularity::Year => Some(Granularity::Quarter),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
}

impl Status {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in-progress" | "inprogress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            _ => Err(CadenceError::format(s, "unknown task status")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a journal entry records about its period.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    PlanStart,
    #[default]
    Reflection,
    Summary,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::PlanStart => "plan-start",
            EntryType::Reflection => "reflection",
            EntryType::Summary => "summary",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Start,
    Score,
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_parse_is_case_insensitive() {
        assert_eq!(Granularity::parse("Quarter").unwrap(), Granularity::Quarter);
        assert_eq!(Granularity::parse(" WEEK ").unwrap(), Granularity::Week);
        assert!(Granularity::parse("fortnight").is_err());
    }

    #[test]
    fn test_granularity_ordering() {
        assert!(Granularity::Year > Granularity::Quarter);
        assert!(Granularity::Quarter > Granularity::Month);
        assert!(Granularity::Month > Granularity::Week);
        assert!(Granularity::Week > Granularity::Day);
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(Granularity::Day.coarser(), Some(Granularity::Week));
        assert_eq!(Granularity::Year.coarser(), None);
        assert_eq!(Granularity::Year.finer(), Some(Granularity::Quarter));
        assert_eq!(Granularity::Day.finer(), None);
    }

    #[test]
    fn test_status_round_trips_through_serde_names() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(Status::parse("in-progress").unwrap(), Status::InProgress);
    }
}
