//! # cadence
//!
//! Calendar-scoped goal tracking. Tasks live at one of five granularities
//! (year, quarter, month, week, day), nest strictly one level at a time and
//! carry a 0-10 score. Journal entries are attached to period labels.
//!
//! The core is pure and synchronous:
//!
//! - [`period`] and [`calendar`] turn references such as `2024-Q4` or
//!   `2025-W15` into half-open date ranges and split ranges into labels.
//! - [`hierarchy`] says which granularity may parent which.
//! - [`tree`] rebuilds parent/child forests from flat records.
//! - [`stats`] rolls task counts and scores up per label.
//!
//! [`db`] and [`config`] provide a file-backed store for the `cad` binary.
//!
//! ```
//! use cadence::calendar::{generate_labels, parse_reference};
//! use cadence::fields::Granularity;
//!
//! let q4 = parse_reference("2024-Q4", Granularity::Quarter).unwrap();
//! assert_eq!(
//!     generate_labels(&q4, Granularity::Month),
//!     vec!["2024-10", "2024-11", "2024-12"]
//! );
//! ```

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod hierarchy;
pub mod period;
pub mod stats;
pub mod task;
pub mod tree;

pub use error::{CadenceError, Result};
pub use period::Period;
