//! Task and journal entry records.
//!
//! These are the flat, persisted shapes. Trees and statistics are derived from
//! them on demand and never stored.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;
use crate::period::Period;
use crate::tree::TreeNode;

/// A goal scoped to one calendar period.
///
/// Tasks nest by granularity (Year > Quarter > Month > Week > Day) through
/// `parent`, which must point at a task of the same owner one level coarser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub granularity: Granularity,
    pub period: Period,
    pub parent: Option<u64>,
    pub owner: String,
    #[serde(default)]
    pub score: u8,
    pub status: Status,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Task {
    /// The date a task is bucketed under in rollups: the last day its period
    /// covers.
    pub fn reference_date(&self) -> NaiveDate {
        self.period.last_day()
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

impl TreeNode for Task {
    fn node_id(&self) -> u64 {
        self.id
    }

    fn parent_id(&self) -> Option<u64> {
        self.parent
    }
}

/// A note attached to a calendar period and, optionally, to tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub content: String,
    pub granularity: Granularity,
    /// Label of the period this entry talks about, e.g. `2025-07` or
    /// `2025-07-13~2025-07-19`.
    pub time_reference: String,
    #[serde(default)]
    pub entry_type: EntryType,
    pub owner: String,
    #[serde(default)]
    pub task_ids: BTreeSet<u64>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}
