//! Error types shared by the calendar core, the database and the CLI.

use chrono::NaiveDate;
use thiserror::Error;

use crate::fields::Granularity;

/// Everything that can go wrong in cadence.
///
/// Parsing failures and rejected hierarchy edges are ordinary values; none of
/// these variants represent a crash.
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("invalid time reference \"{input}\": {reason}")]
    Format { input: String, reason: String },

    #[error("invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error(
        "{child} task cannot be a child of a {parent} task (expected {})",
        crate::hierarchy::describe()
    )]
    Hierarchy { parent: Granularity, child: Granularity },

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("journal entry {0} not found")]
    JournalNotFound(u64),

    #[error("record belongs to a different owner")]
    OwnerMismatch,

    #[error("task {id} has {count} child task(s); delete those first")]
    HasChildren { id: u64, count: usize },

    #[error("setting this parent would make task {id} its own ancestor")]
    Cycle { id: u64 },

    #[error("score {0} out of range (expected 0-10)")]
    InvalidScore(u8),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CadenceError {
    /// Shorthand for a [`CadenceError::Format`].
    pub fn format(input: &str, reason: impl Into<String>) -> Self {
        CadenceError::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CadenceError>;
