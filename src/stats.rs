//! Rollups and summaries over flat task and journal snapshots.
//!
//! Every function here is a pure function of its inputs. Empty inputs give
//! zero-filled results, never errors.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::calendar::{generate_labels, parse_label};
use crate::fields::*;
use crate::period::Period;
use crate::task::{JournalEntry, Task};
use crate::tree::{build_ancestor_chain, build_forest, TaskTree};

/// One row per calendar label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStat {
    pub group_key: String,
    pub task_count: u64,
    pub score_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollupSummary {
    pub total_score: u64,
    pub total_count: u64,
    /// Per label, so empty labels pull the average down.
    pub average_score: f64,
    pub average_count: f64,
    pub max_score: u64,
    pub max_count: u64,
    /// Smallest non-zero label value, 0 if every label is empty.
    pub min_score: u64,
    pub min_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
    pub period: Period,
    pub scale: Granularity,
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    pub scores: Vec<u64>,
    pub summary: RollupSummary,
}

#[derive(Default, Clone, Copy)]
struct DayBucket {
    count: u64,
    score: u64,
}

fn non_zero_min(values: &[u64]) -> u64 {
    values.iter().copied().filter(|&v| v > 0).min().unwrap_or(0)
}

/// Count and sum task scores per label of `scale` inside `period`.
///
/// Tasks are bucketed by [`Task::reference_date`]; each label then collects
/// the buckets of the sub-period it names, clipped to `period`. Days outside
/// `period` never count, even when a label's own range reaches past it.
pub fn rollup(tasks: &[Task], period: &Period, scale: Granularity) -> Rollup {
    let labels = generate_labels(period, scale);

    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for t in tasks {
        let bucket = days.entry(t.reference_date()).or_default();
        bucket.count += 1;
        bucket.score += u64::from(t.score);
    }

    let mut counts = Vec::with_capacity(labels.len());
    let mut scores = Vec::with_capacity(labels.len());
    for label in &labels {
        let (count, score) = match parse_label(label, scale) {
            Ok(sub) => {
                let lo = sub.start.max(period.start);
                let hi = sub.end.min(period.end);
                if lo < hi {
                    days.range(lo..hi)
                        .fold((0, 0), |(c, s), (_, b)| (c + b.count, s + b.score))
                } else {
                    (0, 0)
                }
            }
            Err(e) => {
                debug!(%label, error = %e, "label does not map back to a period");
                (0, 0)
            }
        };
        counts.push(count);
        scores.push(score);
    }

    let total_score: u64 = scores.iter().sum();
    let total_count: u64 = counts.iter().sum();
    let n = labels.len();
    let summary = RollupSummary {
        total_score,
        total_count,
        average_score: if n > 0 { total_score as f64 / n as f64 } else { 0.0 },
        average_count: if n > 0 { total_count as f64 / n as f64 } else { 0.0 },
        max_score: scores.iter().copied().max().unwrap_or(0),
        max_count: counts.iter().copied().max().unwrap_or(0),
        min_score: non_zero_min(&scores),
        min_count: non_zero_min(&counts),
    };

    Rollup {
        period: *period,
        scale,
        labels,
        counts,
        scores,
        summary,
    }
}

/// Flatten a rollup into one [`GroupStat`] per label.
pub fn group_stats(rollup: &Rollup) -> Vec<GroupStat> {
    rollup
        .labels
        .iter()
        .zip(rollup.counts.iter().zip(&rollup.scores))
        .map(|(label, (&task_count, &score_total))| GroupStat {
            group_key: label.clone(),
            task_count,
            score_total,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionStats {
    pub total: u64,
    pub completed: u64,
    /// Percentage in `0.0..=100.0`.
    pub rate: f64,
    pub by_granularity: BTreeMap<Granularity, u64>,
    pub by_status: BTreeMap<Status, u64>,
}

/// Completion counts for tasks whose period overlaps `period`.
pub fn completion_stats(tasks: &[Task], period: &Period) -> CompletionStats {
    let mut stats = CompletionStats::default();
    for t in tasks.iter().filter(|t| t.period.overlaps(period)) {
        stats.total += 1;
        *stats.by_granularity.entry(t.granularity).or_default() += 1;
        *stats.by_status.entry(t.status).or_default() += 1;
        if t.is_completed() {
            stats.completed += 1;
        }
    }
    if stats.total > 0 {
        stats.rate = stats.completed as f64 / stats.total as f64 * 100.0;
    }
    stats
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub total_tasks: u64,
    pub total_score: u64,
    pub completed_tasks: u64,
    pub completed_score: u64,
    pub in_progress_tasks: u64,
    pub pending_tasks: u64,
}

impl PlanStats {
    fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = PlanStats::default();
        for t in tasks {
            stats.total_tasks += 1;
            stats.total_score += u64::from(t.score);
            match t.status {
                Status::Completed => {
                    stats.completed_tasks += 1;
                    stats.completed_score += u64::from(t.score);
                }
                Status::InProgress => stats.in_progress_tasks += 1,
                Status::Pending => stats.pending_tasks += 1,
            }
        }
        stats
    }
}

/// Everything needed to render one planning window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub period: Period,
    pub scale: Granularity,
    pub labels: Vec<String>,
    pub tasks: Vec<TaskTree>,
    pub journals: Vec<JournalEntry>,
    pub stats: PlanStats,
    pub groups: Vec<GroupStat>,
}

/// Assemble the plan for `period` at `scale`.
///
/// Tasks of granularity `scale` overlapping `period` are selected together
/// with their full ancestor chains and arranged as a forest. Journals match
/// on `(scale, label)` for the labels of `period`. Group rows roll up the day
/// tasks inside the window.
pub fn plan_view(
    tasks: &[Task],
    journals: &[JournalEntry],
    period: &Period,
    scale: Granularity,
) -> PlanView {
    let mut wanted: HashSet<u64> = HashSet::new();
    for t in tasks
        .iter()
        .filter(|t| t.granularity == scale && t.period.overlaps(period))
    {
        wanted.insert(t.id);
        wanted.extend(build_ancestor_chain(t, tasks).iter().map(|a| a.id));
    }
    let selected: Vec<Task> = tasks
        .iter()
        .filter(|t| wanted.contains(&t.id))
        .cloned()
        .collect();

    let labels = generate_labels(period, scale);
    let label_set: HashSet<&str> = labels.iter().map(String::as_str).collect();
    let mut matched: Vec<JournalEntry> = journals
        .iter()
        .filter(|j| j.granularity == scale && label_set.contains(j.time_reference.as_str()))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc).then(a.id.cmp(&b.id)));

    let day_tasks: Vec<Task> = tasks
        .iter()
        .filter(|t| t.granularity == Granularity::Day && period.contains(t.reference_date()))
        .cloned()
        .collect();
    let groups = group_stats(&rollup(&day_tasks, period, scale));

    debug!(
        selected = selected.len(),
        journals = matched.len(),
        labels = labels.len(),
        "assembled plan view"
    );

    PlanView {
        period: *period,
        scale,
        labels,
        stats: PlanStats::tally(&selected),
        tasks: build_forest(&selected),
        journals: matched,
        groups,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeDistribution {
    pub tasks_by_granularity: BTreeMap<Granularity, u64>,
    pub journals_by_granularity: BTreeMap<Granularity, u64>,
}

fn created_on(ts: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive())
}

/// How records created inside `period` spread over granularities.
pub fn time_distribution(
    tasks: &[Task],
    journals: &[JournalEntry],
    period: &Period,
) -> TimeDistribution {
    let mut dist = TimeDistribution::default();
    let inside = |ts: i64| created_on(ts).is_some_and(|d| period.contains(d));
    for t in tasks.iter().filter(|t| inside(t.created_at_utc)) {
        *dist.tasks_by_granularity.entry(t.granularity).or_default() += 1;
    }
    for j in journals.iter().filter(|j| inside(j.created_at_utc)) {
        *dist.journals_by_granularity.entry(j.granularity).or_default() += 1;
    }
    dist
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub active_tasks: u64,
    /// Mean score of completed tasks with a non-zero score.
    pub average_score: f64,
    pub total_journals: u64,
}

pub fn overview(tasks: &[Task], journals: &[JournalEntry]) -> Overview {
    let mut out = Overview {
        total_tasks: tasks.len() as u64,
        total_journals: journals.len() as u64,
        ..Overview::default()
    };
    let mut score_sum = 0u64;
    let mut scored = 0u64;
    for t in tasks {
        match t.status {
            Status::Completed => {
                out.completed_tasks += 1;
                if t.score > 0 {
                    score_sum += u64::from(t.score);
                    scored += 1;
                }
            }
            Status::InProgress => out.active_tasks += 1,
            Status::Pending => {}
        }
    }
    if scored > 0 {
        out.average_score = score_sum as f64 / scored as f64;
    }
    out
}
