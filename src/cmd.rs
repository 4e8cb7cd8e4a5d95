//! Command implementations for the CLI interface.
//!
//! Each `cmd_*` handler works on a [`Session`], prints either a table or JSON
//! and returns errors to `main` instead of exiting.

use std::cmp::Reverse;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;

use crate::calendar::{
    canonical_period, generate_labels, parse_label, parse_reference, SundayWeekLabeler,
};
use crate::db::*;
use crate::error::Result;
use crate::fields::*;
use crate::period::Period;
use crate::stats::{
    completion_stats, overview, plan_view, rollup, time_distribution, CompletionStats, Overview,
    PlanView, Rollup, TimeDistribution,
};
use crate::task::{JournalEntry, Task};
use crate::tree::{build_ancestor_chain, build_forest, Forest, TaskTree, Tree};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Granularity of the task.
        #[arg(long, short, value_enum, default_value_t = Granularity::Day, ignore_case = true)]
        scale: Granularity,
        /// Period reference: 2025, 2025-Q3, 2025-07, 2025-W29 or 2025-07-14.
        /// Defaults to the period containing today.
        #[arg(long, conflicts_with = "start")]
        at: Option<String>,
        /// First day (YYYY-MM-DD) of custom dates instead of --at.
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Last day (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Parent task ID, exactly one level coarser.
        #[arg(long)]
        parent: Option<u64>,
        /// Score from 0 to 10.
        #[arg(long, default_value_t = 0)]
        score: u8,
        #[arg(long, value_enum, default_value_t = Status::Pending, ignore_case = true)]
        status: Status,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Only tasks of this granularity.
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        /// Only tasks overlapping this period (read at --scale, else the default scale).
        #[arg(long)]
        at: Option<String>,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Filter by status.
        #[arg(long, value_enum, ignore_case = true)]
        status: Option<Status>,
        /// Filter by tag. May be repeated. Accepts comma-separated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Render as a tree across parent-child relationships.
        #[arg(long)]
        tree: bool,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Start)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task.
    View {
        id: u64,
        /// Show child subtree.
        #[arg(long)]
        children: bool,
        /// Show ancestor chain.
        #[arg(long)]
        parents: bool,
    },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// New parent task ID.
        #[arg(long, conflicts_with = "clear_parent")]
        parent: Option<u64>,
        /// Detach from the current parent.
        #[arg(long)]
        clear_parent: bool,
        #[arg(long, value_enum, ignore_case = true)]
        status: Option<Status>,
        #[arg(long)]
        score: Option<u8>,
        /// New first day (YYYY-MM-DD).
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// New last day (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Add tags. May be repeated and comma-separated.
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        /// Remove tags. May be repeated and comma-separated.
        #[arg(long = "rm-tag")]
        rm_tags: Vec<String>,
    },

    /// Mark a task completed.
    Complete { id: u64 },

    /// Reopen a task (status pending).
    Reopen { id: u64 },

    /// Set a task's score (0-10).
    Score { id: u64, score: u8 },

    /// Delete a task. Tasks with children must be emptied first.
    Delete { id: u64 },

    /// Manage journal entries.
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Show the plan for a period: task trees, journals and progress.
    Plan {
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        /// Period reference at --scale. Defaults to the current period.
        #[arg(long)]
        at: Option<String>,
    },

    /// Roll task counts and scores up into calendar buckets.
    Trend {
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        #[arg(long)]
        at: Option<String>,
        /// Bucket size. Defaults to --scale.
        #[arg(long, value_enum, ignore_case = true)]
        by: Option<Granularity>,
        /// Granularity of the tasks being counted.
        #[arg(long, value_enum, default_value_t = Granularity::Day, ignore_case = true)]
        level: Granularity,
    },

    /// Completion rate, distribution and overview for a period.
    Stats {
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the bucket labels a period splits into.
    Labels {
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        #[arg(long)]
        at: Option<String>,
        /// Bucket size. Defaults to --scale.
        #[arg(long, value_enum, ignore_case = true)]
        by: Option<Granularity>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write a journal entry for a period.
    Add {
        content: String,
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        /// Period reference or week label. Defaults to the current period.
        #[arg(long)]
        at: Option<String>,
        #[arg(long = "type", value_enum, default_value_t = EntryType::Reflection)]
        entry_type: EntryType,
        /// Link to a task. May be repeated.
        #[arg(long = "task")]
        tasks: Vec<u64>,
    },
    /// List journal entries, newest first.
    List {
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        /// Only entries labelled inside this period.
        #[arg(long)]
        at: Option<String>,
    },
    /// Edit a journal entry's text, type or period.
    Edit {
        id: u64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, short, value_enum, ignore_case = true)]
        scale: Option<Granularity>,
        /// New period reference or week label, read at --scale or the entry's scale.
        #[arg(long)]
        at: Option<String>,
        #[arg(long = "type", value_enum)]
        entry_type: Option<EntryType>,
    },
    /// Link a journal entry to a task.
    Link {
        journal: u64,
        task: u64,
        /// Remove the link instead.
        #[arg(long)]
        remove: bool,
    },
    /// Delete a journal entry.
    Delete { id: u64 },
}

/// The loaded database plus who is asking and how to print.
pub struct Session {
    pub db: Database,
    pub db_path: PathBuf,
    pub owner: String,
    pub default_scale: Granularity,
    pub json: bool,
}

impl Session {
    fn save(&self) -> Result<()> {
        self.db.save(&self.db_path)
    }

    fn scale(&self, scale: Option<Granularity>) -> Granularity {
        scale.unwrap_or(self.default_scale)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The period named by `at` at `scale`, or the one containing today.
pub fn resolve_period(scale: Granularity, at: Option<&str>) -> Result<Period> {
    match at {
        Some(r) => parse_label(r, scale),
        None => Ok(canonical_period(scale, today())),
    }
}

/// Custom dates from an inclusive pair of days.
pub fn custom_period(start: &str, end: &str) -> Result<Period> {
    let first = parse_reference(start, Granularity::Day)?;
    let last = parse_reference(end, Granularity::Day)?;
    Period::new(first.start, last.end)
}

/// Label of the `scale` bucket holding `date`, in the form journals store.
pub fn current_label(scale: Granularity, date: NaiveDate) -> String {
    if scale == Granularity::Week {
        let first = SundayWeekLabeler::bucket_start(date);
        return SundayWeekLabeler::label(first, first + Duration::days(6));
    }
    generate_labels(&canonical_period(scale, date), scale)
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// `2025-07-14` for a single day, `2025-07-01..2025-07-31` otherwise.
pub fn format_period(p: &Period) -> String {
    if p.num_days() == 1 {
        p.start.format("%Y-%m-%d").to_string()
    } else {
        format!("{}..{}", p.start.format("%Y-%m-%d"), p.last_day().format("%Y-%m-%d"))
    }
}

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".into())
}

/// Print tasks in a table, indenting titles by the paired depth.
pub fn print_table(rows: &[(&Task, usize)]) {
    println!(
        "{:<5} {:<8} {:<12} {:<5} {:<22} {}",
        "ID", "Scale", "Status", "Score", "Period", "Title [tags]"
    );
    for (t, depth) in rows {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        println!(
            "{:<5} {:<8} {:<12} {:<5} {:<22} {}{}{}",
            t.id,
            t.granularity,
            t.status,
            t.score,
            format_period(&t.period),
            "  ".repeat(*depth),
            truncate(&t.title, 48),
            tags
        );
    }
}

fn print_tree_lines(tree: &TaskTree, base_depth: usize) {
    let mut nodes = Vec::new();
    tree.walk(&mut nodes);
    for n in nodes {
        let t = &n.node;
        println!(
            "{}- {} [{}] ({}, score {}) (#{})",
            "  ".repeat(n.depth.saturating_sub(base_depth) + 1),
            t.title,
            t.granularity,
            t.status,
            t.score,
            t.id
        );
    }
}

/// Add a new task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    session: &mut Session,
    title: String,
    scale: Granularity,
    at: Option<String>,
    dates: Option<(String, String)>,
    desc: Option<String>,
    parent: Option<u64>,
    score: u8,
    status: Status,
    tags: Vec<String>,
) -> Result<()> {
    let period = match dates {
        Some((start, end)) => custom_period(&start, &end)?,
        None => resolve_period(scale, at.as_deref())?,
    };
    let id = session.db.create_task(NewTask {
        title,
        description: desc,
        granularity: scale,
        period,
        parent,
        owner: session.owner.clone(),
        score,
        status,
        tags,
    })?;
    session.save()?;
    println!("Added {} task {} for {}", scale, id, format_period(&period));
    Ok(())
}

/// List tasks with optional filtering and sorting.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    session: &Session,
    scale: Option<Granularity>,
    at: Option<String>,
    all: bool,
    status: Option<Status>,
    tags: Vec<String>,
    tree: bool,
    sort: SortKey,
    limit: Option<usize>,
) -> Result<()> {
    let tags = split_and_normalise_tags(&tags);
    let window = match at.as_deref() {
        Some(r) => Some(parse_label(r, session.scale(scale))?),
        None => None,
    };

    let mut filtered: Vec<Task> = session
        .db
        .tasks_for_owner(&session.owner)
        .into_iter()
        .filter(|t| {
            if !all && status.is_none() && t.is_completed() {
                return false;
            }
            if status.is_some_and(|s| t.status != s) {
                return false;
            }
            if scale.is_some_and(|g| t.granularity != g) {
                return false;
            }
            if window.is_some_and(|w| !t.period.overlaps(&w)) {
                return false;
            }
            tags.iter().all(|tg| t.tags.contains(tg))
        })
        .collect();

    match sort {
        SortKey::Start => {
            filtered.sort_by_key(|t| (t.period.start, Reverse(t.granularity), t.id))
        }
        SortKey::Score => filtered.sort_by_key(|t| (Reverse(t.score), t.id)),
        SortKey::Id => filtered.sort_by_key(|t| t.id),
    }
    if let Some(n) = limit {
        filtered.truncate(n);
    }

    if session.json {
        return if tree {
            print_json(&build_forest(&filtered))
        } else {
            print_json(&filtered)
        };
    }

    if tree {
        let forest = build_forest(&filtered);
        let mut nodes: Vec<&Tree<Task>> = Vec::new();
        for root in &forest {
            root.walk(&mut nodes);
        }
        let rows: Vec<(&Task, usize)> = nodes.iter().map(|n| (&n.node, n.depth)).collect();
        print_table(&rows);
    } else {
        let rows: Vec<(&Task, usize)> = filtered.iter().map(|t| (t, 0)).collect();
        print_table(&rows);
    }
    Ok(())
}

#[derive(Serialize)]
struct TaskDetail<'a> {
    task: &'a Task,
    ancestors: Vec<Task>,
    subtree: Option<TaskTree>,
    journals: Vec<&'a JournalEntry>,
}

/// View detailed information about a specific task.
pub fn cmd_view(session: &Session, id: u64, children: bool, parents: bool) -> Result<()> {
    let task = session.db.task_for(id, &session.owner)?;
    let owned = session.db.tasks_for_owner(&session.owner);
    let ancestors = if parents {
        build_ancestor_chain(task, &owned)
    } else {
        Vec::new()
    };
    let subtree = if children {
        let forest = Forest::new(&owned);
        forest.position(id).map(|idx| forest.subtree(idx))
    } else {
        None
    };
    let journals: Vec<&JournalEntry> = session
        .db
        .journals
        .iter()
        .filter(|j| j.owner == session.owner && j.task_ids.contains(&id))
        .collect();

    if session.json {
        return print_json(&TaskDetail {
            task,
            ancestors,
            subtree,
            journals,
        });
    }

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Scale:        {}", task.granularity);
    println!("Period:       {} {}", format_period(&task.period), task.period);
    println!("Status:       {}", task.status);
    println!("Score:        {}", task.score);
    println!("Owner:        {}", task.owner);
    println!(
        "Parent:       {}",
        task.parent.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
    );
    println!(
        "Tags:         {}",
        if task.tags.is_empty() { "-".into() } else { task.tags.join(",") }
    );
    println!("Created UTC:  {}", format_timestamp(task.created_at_utc));
    println!("Updated UTC:  {}", format_timestamp(task.updated_at_utc));
    println!(
        "Description:\n{}\n",
        task.description.as_deref().unwrap_or("-")
    );

    if parents {
        if ancestors.is_empty() {
            println!("Ancestors: -");
        } else {
            let chain: Vec<String> = ancestors
                .iter()
                .map(|a| format!("{} (#{})", a.title, a.id))
                .collect();
            println!("Ancestors (root first): {}", chain.join(" -> "));
        }
    }

    if children {
        println!("Children:");
        match subtree.as_ref().filter(|s| !s.children.is_empty()) {
            Some(root) => {
                for c in &root.children {
                    print_tree_lines(c, root.depth + 1);
                }
            }
            None => println!("  -"),
        }
    }

    if !journals.is_empty() {
        println!("Journal:");
        for j in journals {
            println!("  #{} {} {}: {}", j.id, j.time_reference, j.entry_type, truncate(&j.content, 60));
        }
    }
    Ok(())
}

/// Update an existing task's fields.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    session: &mut Session,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    parent: Option<u64>,
    clear_parent: bool,
    status: Option<Status>,
    score: Option<u8>,
    dates: Option<(String, String)>,
    add_tags: Vec<String>,
    rm_tags: Vec<String>,
) -> Result<()> {
    let parent = if clear_parent { Some(None) } else { parent.map(Some) };
    let period = match dates {
        Some((start, end)) => Some(custom_period(&start, &end)?),
        None => None,
    };
    session.db.update_task(
        id,
        &session.owner,
        TaskUpdate {
            title,
            description: desc,
            parent,
            status,
            score,
            period,
            add_tags,
            rm_tags,
        },
    )?;
    session.save()?;
    println!("Updated task {id}");
    Ok(())
}

/// Change a task's status.
pub fn cmd_set_status(session: &mut Session, id: u64, status: Status) -> Result<()> {
    session.db.set_status(id, &session.owner, status)?;
    session.save()?;
    println!("Task {id} is now {status}");
    Ok(())
}

pub fn cmd_score(session: &mut Session, id: u64, score: u8) -> Result<()> {
    session.db.set_score(id, &session.owner, score)?;
    session.save()?;
    println!("Task {id} scored {score}");
    Ok(())
}

pub fn cmd_delete(session: &mut Session, id: u64) -> Result<()> {
    let removed = session.db.delete_task(id, &session.owner)?;
    session.save()?;
    println!("Deleted task {} ({})", removed.id, removed.title);
    Ok(())
}

/// Handle journal commands.
pub fn cmd_journal(session: &mut Session, action: JournalAction) -> Result<()> {
    match action {
        JournalAction::Add {
            content,
            scale,
            at,
            entry_type,
            tasks,
        } => {
            let scale = session.scale(scale);
            let time_reference = at.unwrap_or_else(|| current_label(scale, today()));
            let id = session.db.create_journal(NewJournal {
                content,
                granularity: scale,
                time_reference: time_reference.clone(),
                entry_type,
                owner: session.owner.clone(),
                task_ids: tasks,
            })?;
            session.save()?;
            println!("Added journal entry {id} for {scale} {time_reference}");
        }
        JournalAction::List { scale, at } => {
            let mut entries = match at.as_deref() {
                Some(r) => {
                    let g = session.scale(scale);
                    let labels = generate_labels(&parse_label(r, g)?, g);
                    session.db.journals_by_labels(&session.owner, g, &labels)
                }
                None => session
                    .db
                    .journals_for_owner(&session.owner)
                    .into_iter()
                    .filter(|j| scale.map_or(true, |g| j.granularity == g))
                    .collect(),
            };
            entries.sort_by_key(|j| (Reverse(j.created_at_utc), j.id));
            if session.json {
                return print_json(&entries);
            }
            println!("{:<5} {:<8} {:<24} {:<11} {:<8} {}", "ID", "Scale", "Reference", "Type", "Tasks", "Content");
            for j in &entries {
                let tasks: Vec<String> = j.task_ids.iter().map(u64::to_string).collect();
                println!(
                    "{:<5} {:<8} {:<24} {:<11} {:<8} {}",
                    j.id,
                    j.granularity,
                    j.time_reference,
                    j.entry_type,
                    if tasks.is_empty() { "-".into() } else { tasks.join(",") },
                    truncate(&j.content, 60)
                );
            }
        }
        JournalAction::Edit {
            id,
            content,
            scale,
            at,
            entry_type,
        } => {
            session.db.update_journal(
                id,
                &session.owner,
                JournalUpdate {
                    content,
                    granularity: scale,
                    time_reference: at,
                    entry_type,
                },
            )?;
            session.save()?;
            println!("Updated journal entry {id}");
        }
        JournalAction::Link {
            journal,
            task,
            remove,
        } => {
            session.db.link_journal(journal, task, &session.owner, !remove)?;
            session.save()?;
            if remove {
                println!("Unlinked journal entry {journal} from task {task}");
            } else {
                println!("Linked journal entry {journal} to task {task}");
            }
        }
        JournalAction::Delete { id } => {
            session.db.delete_journal(id, &session.owner)?;
            session.save()?;
            println!("Deleted journal entry {id}");
        }
    }
    Ok(())
}

/// Show the plan view for a period.
pub fn cmd_plan(session: &Session, scale: Option<Granularity>, at: Option<String>) -> Result<()> {
    let scale = session.scale(scale);
    let period = resolve_period(scale, at.as_deref())?;
    let view = plan_view(
        &session.db.tasks_for_owner(&session.owner),
        &session.db.journals_for_owner(&session.owner),
        &period,
        scale,
    );
    if session.json {
        return print_json(&view);
    }
    print_plan(&view);
    Ok(())
}

fn print_plan(view: &PlanView) {
    println!("Plan: {} {}", view.scale, format_period(&view.period));
    println!("Tasks:");
    if view.tasks.is_empty() {
        println!("  -");
    }
    for root in &view.tasks {
        print_tree_lines(root, 0);
    }

    let s = &view.stats;
    println!(
        "Progress: {}/{} completed, {} in progress, {} pending, score {}/{}",
        s.completed_tasks,
        s.total_tasks,
        s.in_progress_tasks,
        s.pending_tasks,
        s.completed_score,
        s.total_score
    );

    if !view.journals.is_empty() {
        println!("Journal:");
        for j in &view.journals {
            println!("  #{} {} {}: {}", j.id, j.time_reference, j.entry_type, truncate(&j.content, 60));
        }
    }

    println!("Buckets:");
    for g in view.groups.iter().filter(|g| g.task_count > 0) {
        println!("  {:<24} {:>4} tasks  {:>5} pts", g.group_key, g.task_count, g.score_total);
    }
}

/// Roll day (or `level`) tasks into buckets of `by` across a period.
pub fn cmd_trend(
    session: &Session,
    scale: Option<Granularity>,
    at: Option<String>,
    by: Option<Granularity>,
    level: Granularity,
) -> Result<()> {
    let scale = session.scale(scale);
    let period = resolve_period(scale, at.as_deref())?;
    let tasks: Vec<Task> = session
        .db
        .tasks_in_period(&session.owner, &period, Some(level));
    let trend = rollup(&tasks, &period, by.unwrap_or(scale));
    if session.json {
        return print_json(&trend);
    }
    print_trend(&trend);
    Ok(())
}

fn print_trend(r: &Rollup) {
    println!("Trend: {} by {}", format_period(&r.period), r.scale);
    println!("{:<24} {:>6} {:>6}", "Bucket", "Tasks", "Score");
    for (i, label) in r.labels.iter().enumerate() {
        println!("{:<24} {:>6} {:>6}", label, r.counts[i], r.scores[i]);
    }
    let s = &r.summary;
    println!(
        "Total {} tasks / {} pts, avg {:.2} tasks / {:.2} pts, max {} / {}, min {} / {}",
        s.total_count,
        s.total_score,
        s.average_count,
        s.average_score,
        s.max_count,
        s.max_score,
        s.min_count,
        s.min_score
    );
}

#[derive(Serialize)]
struct StatsReport {
    period: Period,
    completion: CompletionStats,
    distribution: TimeDistribution,
    overview: Overview,
}

/// Completion rate for the period plus an all-time overview.
pub fn cmd_stats(session: &Session, scale: Option<Granularity>, at: Option<String>) -> Result<()> {
    let scale = session.scale(scale);
    let period = resolve_period(scale, at.as_deref())?;
    let tasks = session.db.tasks_for_owner(&session.owner);
    let journals = session.db.journals_for_owner(&session.owner);
    let report = StatsReport {
        period,
        completion: completion_stats(&tasks, &period),
        distribution: time_distribution(&tasks, &journals, &period),
        overview: overview(&tasks, &journals),
    };
    if session.json {
        return print_json(&report);
    }

    let c = &report.completion;
    println!("Stats: {} {}", scale, format_period(&period));
    println!("Completion:   {}/{} ({:.1}%)", c.completed, c.total, c.rate);
    for (g, n) in &c.by_granularity {
        println!("  {:<10} {}", g, n);
    }
    for (s, n) in &c.by_status {
        println!("  {:<12} {}", s, n);
    }
    let d = &report.distribution;
    println!("Created in period:");
    for g in Granularity::ALL {
        let tasks = d.tasks_by_granularity.get(&g).copied().unwrap_or(0);
        let journals = d.journals_by_granularity.get(&g).copied().unwrap_or(0);
        if tasks + journals > 0 {
            println!("  {:<10} {} tasks, {} journal entries", g, tasks, journals);
        }
    }
    let o = &report.overview;
    println!(
        "Overall:      {} tasks, {} completed, {} in progress, avg score {:.2}, {} journal entries",
        o.total_tasks, o.completed_tasks, o.active_tasks, o.average_score, o.total_journals
    );
    Ok(())
}

/// Print the labels a period splits into at bucket size `by`.
pub fn cmd_labels(
    session: &Session,
    scale: Option<Granularity>,
    at: Option<String>,
    by: Option<Granularity>,
) -> Result<()> {
    let scale = session.scale(scale);
    let period = resolve_period(scale, at.as_deref())?;
    let labels = generate_labels(&period, by.unwrap_or(scale));
    if session.json {
        return print_json(&labels);
    }
    for l in labels {
        println!("{l}");
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Run every command that needs the database.
pub fn run(session: &mut Session, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            title,
            scale,
            at,
            start,
            end,
            desc,
            parent,
            score,
            status,
            tags,
        } => cmd_add(
            session,
            title,
            scale,
            at,
            start.zip(end),
            desc,
            parent,
            score,
            status,
            tags,
        ),

        Commands::List {
            scale,
            at,
            all,
            status,
            tags,
            tree,
            sort,
            limit,
        } => cmd_list(session, scale, at, all, status, tags, tree, sort, limit),

        Commands::View {
            id,
            children,
            parents,
        } => cmd_view(session, id, children, parents),

        Commands::Update {
            id,
            title,
            desc,
            parent,
            clear_parent,
            status,
            score,
            start,
            end,
            add_tags,
            rm_tags,
        } => cmd_update(
            session,
            id,
            title,
            desc,
            parent,
            clear_parent,
            status,
            score,
            start.zip(end),
            add_tags,
            rm_tags,
        ),

        Commands::Complete { id } => cmd_set_status(session, id, Status::Completed),

        Commands::Reopen { id } => cmd_set_status(session, id, Status::Pending),

        Commands::Score { id, score } => cmd_score(session, id, score),

        Commands::Delete { id } => cmd_delete(session, id),

        Commands::Journal { action } => cmd_journal(session, action),

        Commands::Plan { scale, at } => cmd_plan(session, scale, at),

        Commands::Trend {
            scale,
            at,
            by,
            level,
        } => cmd_trend(session, scale, at, by, level),

        Commands::Stats { scale, at } => cmd_stats(session, scale, at),

        Commands::Labels { scale, at, by } => cmd_labels(session, scale, at, by),

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
        assert_eq!(truncate("abc", 0), "…");
    }

    #[test]
    fn test_format_period() {
        let day = parse_reference("2025-07-14", Granularity::Day).unwrap();
        assert_eq!(format_period(&day), "2025-07-14");
        let month = parse_reference("2025-07", Granularity::Month).unwrap();
        assert_eq!(format_period(&month), "2025-07-01..2025-07-31");
    }

    #[test]
    fn test_current_label_matches_plan_labels() {
        // Wednesday 2025-07-16 sits in the Sunday bucket 07-13..07-19.
        assert_eq!(
            current_label(Granularity::Week, d(2025, 7, 16)),
            "2025-07-13~2025-07-19"
        );
        assert_eq!(current_label(Granularity::Quarter, d(2025, 7, 16)), "2025-Q3");
        assert_eq!(current_label(Granularity::Day, d(2025, 7, 16)), "2025-07-16");

        let month = resolve_period(Granularity::Month, Some("2025-07")).unwrap();
        let labels = generate_labels(&month, Granularity::Week);
        assert!(labels.contains(&current_label(Granularity::Week, d(2025, 7, 16))));
    }

    #[test]
    fn test_custom_period_is_inclusive() {
        let p = custom_period("2025-07-14", "2025-07-20").unwrap();
        assert_eq!(p.start, d(2025, 7, 14));
        assert_eq!(p.end, d(2025, 7, 21));
        assert_eq!(p.num_days(), 7);

        assert_eq!(custom_period("2025-07-14", "2025-07-14").unwrap().num_days(), 1);
        assert!(matches!(
            custom_period("2025-07-20", "2025-07-14"),
            Err(crate::error::CadenceError::InvalidPeriod { .. })
        ));
        assert!(custom_period("2025-07-14", "2025-07").is_err());
    }

    #[test]
    fn test_resolve_period_rejects_bad_reference() {
        assert!(resolve_period(Granularity::Quarter, Some("2025-Q5")).is_err());
        let p = resolve_period(Granularity::Week, None).unwrap();
        assert_eq!(p.num_days(), 7);
    }
}
