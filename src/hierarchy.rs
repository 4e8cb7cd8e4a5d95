//! Which granularity may parent which.
//!
//! The hierarchy is strict: Year > Quarter > Month > Week > Day, each level
//! only parenting the level directly below it. Day tasks are leaves.

use crate::fields::Granularity;

/// Granularities allowed as direct children of `parent`.
pub fn allowed_children(parent: Granularity) -> &'static [Granularity] {
    match parent {
        Granularity::Year => &[Granularity::Quarter],
        Granularity::Quarter => &[Granularity::Month],
        Granularity::Month => &[Granularity::Week],
        Granularity::Week => &[Granularity::Day],
        Granularity::Day => &[],
    }
}

/// Validate that a parent-child relationship follows the hierarchical rules.
pub fn is_valid_edge(parent: Granularity, child: Granularity) -> bool {
    allowed_children(parent).contains(&child)
}

/// Human-readable chain for error hints.
pub fn describe() -> &'static str {
    "year > quarter > month > week > day"
}
