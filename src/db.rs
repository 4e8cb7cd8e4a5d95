//! File-backed storage for tasks and journal entries.
//!
//! `Database` is the whole store, loaded from and saved to a single JSON file.
//! Every mutation goes through a method here so ownership, hierarchy and
//! score rules are enforced in one place. The calendar core and the
//! aggregator never touch this module; they receive the snapshots it returns.

use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{matches_granularity, parse_label};
use crate::error::{CadenceError, Result};
use crate::fields::*;
use crate::hierarchy::is_valid_edge;
use crate::period::Period;
use crate::task::{JournalEntry, Task};
use crate::tree::{build_children_map, collect_descendants};

/// Highest score a task may carry.
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub journals: Vec<JournalEntry>,
}

/// Input for [`Database::create_task`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub granularity: Granularity,
    pub period: Period,
    pub parent: Option<u64>,
    pub owner: String,
    pub score: u8,
    pub status: Status,
    pub tags: Vec<String>,
}

/// Field changes for [`Database::update_task`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` detaches the task from its parent.
    pub parent: Option<Option<u64>>,
    pub status: Option<Status>,
    pub score: Option<u8>,
    /// New dates. Must be valid; need not align with the granularity.
    pub period: Option<Period>,
    pub add_tags: Vec<String>,
    pub rm_tags: Vec<String>,
}

/// Input for [`Database::create_journal`].
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub content: String,
    pub granularity: Granularity,
    pub time_reference: String,
    pub entry_type: EntryType,
    pub owner: String,
    pub task_ids: Vec<u64>,
}

/// Field changes for [`Database::update_journal`].
#[derive(Debug, Clone, Default)]
pub struct JournalUpdate {
    pub content: Option<String>,
    pub granularity: Option<Granularity>,
    /// Re-checked against the resulting granularity.
    pub time_reference: Option<String>,
    pub entry_type: Option<EntryType>,
}

impl Database {
    /// Load the database, or an empty one if `path` does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no database file, starting empty");
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path)?;
        let db: Database = serde_json::from_str(&buf)?;
        debug!(
            path = %path.display(),
            tasks = db.tasks.len(),
            journals = db.journals.len(),
            "loaded database"
        );
        Ok(db)
    }

    /// Save via a temp file and a rename so a crash never leaves half a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_journal_id(&self) -> u64 {
        self.journals.iter().map(|j| j.id).max().unwrap_or(0) + 1
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_journal(&self, id: u64) -> Option<&JournalEntry> {
        self.journals.iter().find(|j| j.id == id)
    }

    /// Fetch a task that must exist and belong to `owner`.
    pub fn task_for(&self, id: u64, owner: &str) -> Result<&Task> {
        let task = self.get(id).ok_or(CadenceError::TaskNotFound(id))?;
        if task.owner != owner {
            return Err(CadenceError::OwnerMismatch);
        }
        Ok(task)
    }

    fn task_mut_for(&mut self, id: u64, owner: &str) -> Result<&mut Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CadenceError::TaskNotFound(id))?;
        if task.owner != owner {
            return Err(CadenceError::OwnerMismatch);
        }
        Ok(task)
    }

    pub fn journal_for(&self, id: u64, owner: &str) -> Result<&JournalEntry> {
        let j = self
            .get_journal(id)
            .ok_or(CadenceError::JournalNotFound(id))?;
        if j.owner != owner {
            return Err(CadenceError::OwnerMismatch);
        }
        Ok(j)
    }

    fn journal_mut_for(&mut self, id: u64, owner: &str) -> Result<&mut JournalEntry> {
        let j = self
            .journals
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(CadenceError::JournalNotFound(id))?;
        if j.owner != owner {
            return Err(CadenceError::OwnerMismatch);
        }
        Ok(j)
    }

    /// Check that `parent` may hold a child of granularity `child`.
    fn check_parent(&self, parent: u64, child: Granularity, owner: &str) -> Result<&Task> {
        let p = self.task_for(parent, owner)?;
        if !is_valid_edge(p.granularity, child) {
            return Err(CadenceError::Hierarchy {
                parent: p.granularity,
                child,
            });
        }
        Ok(p)
    }

    /// Insert a task and return its id.
    ///
    /// The parent, if any, must belong to the same owner and be exactly one
    /// level coarser. The new task starts with its parent's tags.
    pub fn create_task(&mut self, new: NewTask) -> Result<u64> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(CadenceError::EmptyField("title"));
        }
        if new.owner.trim().is_empty() {
            return Err(CadenceError::EmptyField("owner"));
        }
        if new.score > MAX_SCORE {
            return Err(CadenceError::InvalidScore(new.score));
        }
        if !new.period.is_valid() {
            return Err(CadenceError::InvalidPeriod {
                start: new.period.start,
                end: new.period.end,
            });
        }
        if !matches_granularity(&new.period, new.granularity) {
            debug!(
                period = %new.period,
                granularity = %new.granularity,
                "task period is not aligned to its granularity"
            );
        }

        let mut tags: BTreeSet<String> = split_and_normalise_tags(&new.tags).into_iter().collect();
        if let Some(pid) = new.parent {
            let parent = self.check_parent(pid, new.granularity, &new.owner)?;
            tags.extend(parent.tags.iter().cloned());
        }

        let now = Utc::now().timestamp();
        let id = self.next_task_id();
        self.tasks.push(Task {
            id,
            title,
            description: new.description.filter(|d| !d.trim().is_empty()),
            granularity: new.granularity,
            period: new.period,
            parent: new.parent,
            owner: new.owner,
            score: new.score,
            status: new.status,
            tags: tags.into_iter().collect(),
            created_at_utc: now,
            updated_at_utc: now,
        });
        info!(id, granularity = %new.granularity, "created task");
        Ok(id)
    }

    /// Apply `update` to task `id`. Nothing changes if any check fails.
    pub fn update_task(&mut self, id: u64, owner: &str, update: TaskUpdate) -> Result<()> {
        let granularity = self.task_for(id, owner)?.granularity;

        if let Some(p) = &update.period {
            if !p.is_valid() {
                return Err(CadenceError::InvalidPeriod {
                    start: p.start,
                    end: p.end,
                });
            }
            if !matches_granularity(p, granularity) {
                debug!(
                    id,
                    period = %p,
                    granularity = %granularity,
                    "task period is not aligned to its granularity"
                );
            }
        }

        if let Some(t) = &update.title {
            if t.trim().is_empty() {
                return Err(CadenceError::EmptyField("title"));
            }
        }
        if let Some(s) = update.score {
            if s > MAX_SCORE {
                return Err(CadenceError::InvalidScore(s));
            }
        }
        if let Some(Some(pid)) = update.parent {
            if pid == id {
                return Err(CadenceError::Cycle { id });
            }
            self.check_parent(pid, granularity, owner)?;
            let below = collect_descendants(id, &build_children_map(&self.tasks));
            if below.contains(&pid) {
                return Err(CadenceError::Cycle { id });
            }
        }

        let task = self.task_mut_for(id, owner)?;
        if let Some(t) = update.title {
            task.title = t.trim().to_string();
        }
        if let Some(d) = update.description {
            task.description = Some(d).filter(|d| !d.trim().is_empty());
        }
        if let Some(p) = update.parent {
            task.parent = p;
        }
        if let Some(s) = update.status {
            task.status = s;
        }
        if let Some(s) = update.score {
            task.score = s;
        }
        if let Some(p) = update.period {
            task.period = p;
        }
        if !update.add_tags.is_empty() || !update.rm_tags.is_empty() {
            let rm: HashSet<String> = split_and_normalise_tags(&update.rm_tags).into_iter().collect();
            let mut tags: BTreeSet<String> = task.tags.drain(..).collect();
            tags.extend(split_and_normalise_tags(&update.add_tags));
            tags.retain(|t| !rm.contains(t));
            task.tags = tags.into_iter().collect();
        }
        task.updated_at_utc = Utc::now().timestamp();
        info!(id, "updated task");
        Ok(())
    }

    pub fn set_status(&mut self, id: u64, owner: &str, status: Status) -> Result<()> {
        self.update_task(
            id,
            owner,
            TaskUpdate {
                status: Some(status),
                ..TaskUpdate::default()
            },
        )
    }

    pub fn set_score(&mut self, id: u64, owner: &str, score: u8) -> Result<()> {
        self.update_task(
            id,
            owner,
            TaskUpdate {
                score: Some(score),
                ..TaskUpdate::default()
            },
        )
    }

    /// Remove a leaf task and unlink it from every journal entry.
    pub fn delete_task(&mut self, id: u64, owner: &str) -> Result<Task> {
        self.task_for(id, owner)?;
        let count = self.tasks.iter().filter(|t| t.parent == Some(id)).count();
        if count > 0 {
            return Err(CadenceError::HasChildren { id, count });
        }
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CadenceError::TaskNotFound(id))?;
        let removed = self.tasks.remove(pos);
        for j in &mut self.journals {
            j.task_ids.remove(&id);
        }
        info!(id, "deleted task");
        Ok(removed)
    }

    /// Snapshot of every task owned by `owner`, in storage order.
    pub fn tasks_for_owner(&self, owner: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect()
    }

    /// Tasks of `owner` whose period overlaps `period`, optionally limited to
    /// one granularity.
    pub fn tasks_in_period(
        &self,
        owner: &str,
        period: &Period,
        granularity: Option<Granularity>,
    ) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.owner == owner && t.period.overlaps(period))
            .filter(|t| granularity.map_or(true, |g| t.granularity == g))
            .cloned()
            .collect()
    }

    /// Insert a journal entry; its time reference must parse for its
    /// granularity and every linked task must belong to the same owner.
    pub fn create_journal(&mut self, new: NewJournal) -> Result<u64> {
        let content = new.content.trim().to_string();
        if content.is_empty() {
            return Err(CadenceError::EmptyField("content"));
        }
        let reference = new.time_reference.trim().to_string();
        parse_label(&reference, new.granularity)?;
        for &tid in &new.task_ids {
            self.task_for(tid, &new.owner)?;
        }

        let now = Utc::now().timestamp();
        let id = self.next_journal_id();
        self.journals.push(JournalEntry {
            id,
            content,
            granularity: new.granularity,
            time_reference: reference,
            entry_type: new.entry_type,
            owner: new.owner,
            task_ids: new.task_ids.into_iter().collect(),
            created_at_utc: now,
            updated_at_utc: now,
        });
        info!(id, granularity = %new.granularity, "created journal entry");
        Ok(id)
    }

    /// Edit a journal entry. The time reference is re-validated whenever the
    /// reference or the granularity changes.
    pub fn update_journal(&mut self, id: u64, owner: &str, update: JournalUpdate) -> Result<()> {
        let current = self.journal_for(id, owner)?;
        let granularity = update.granularity.unwrap_or(current.granularity);
        let reference = update
            .time_reference
            .as_deref()
            .map(str::trim)
            .unwrap_or(current.time_reference.as_str())
            .to_string();
        if update.granularity.is_some() || update.time_reference.is_some() {
            parse_label(&reference, granularity)?;
        }
        let content = match update.content {
            Some(c) if c.trim().is_empty() => return Err(CadenceError::EmptyField("content")),
            Some(c) => Some(c.trim().to_string()),
            None => None,
        };

        let j = self.journal_mut_for(id, owner)?;
        if let Some(c) = content {
            j.content = c;
        }
        if let Some(t) = update.entry_type {
            j.entry_type = t;
        }
        j.granularity = granularity;
        j.time_reference = reference;
        j.updated_at_utc = Utc::now().timestamp();
        info!(id, granularity = %granularity, "updated journal entry");
        Ok(())
    }

    /// Link (or with `link == false`, unlink) a journal entry and a task.
    pub fn link_journal(&mut self, journal: u64, task: u64, owner: &str, link: bool) -> Result<()> {
        self.task_for(task, owner)?;
        let j = self.journal_mut_for(journal, owner)?;
        let changed = if link {
            j.task_ids.insert(task)
        } else {
            j.task_ids.remove(&task)
        };
        if changed {
            j.updated_at_utc = Utc::now().timestamp();
            info!(journal, task, link, "changed journal link");
        }
        Ok(())
    }

    pub fn delete_journal(&mut self, id: u64, owner: &str) -> Result<JournalEntry> {
        self.journal_for(id, owner)?;
        let pos = self
            .journals
            .iter()
            .position(|j| j.id == id)
            .ok_or(CadenceError::JournalNotFound(id))?;
        info!(id, "deleted journal entry");
        Ok(self.journals.remove(pos))
    }

    pub fn journals_for_owner(&self, owner: &str) -> Vec<JournalEntry> {
        self.journals
            .iter()
            .filter(|j| j.owner == owner)
            .cloned()
            .collect()
    }

    /// Journal entries of `owner` at `granularity` whose reference is one of
    /// `labels`.
    pub fn journals_by_labels(
        &self,
        owner: &str,
        granularity: Granularity,
        labels: &[String],
    ) -> Vec<JournalEntry> {
        let wanted: HashSet<&str> = labels.iter().map(String::as_str).collect();
        self.journals
            .iter()
            .filter(|j| {
                j.owner == owner
                    && j.granularity == granularity
                    && wanted.contains(j.time_reference.as_str())
            })
            .cloned()
            .collect()
    }
}

/// Normalize a tag string by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "-")
}

/// Split comma-separated tag strings, normalise, sort and dedup.
pub fn split_and_normalise_tags(inputs: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = inputs
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(normalise_tag)
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_reference;
    use chrono::NaiveDate;

    fn new_task(title: &str, g: Granularity, reference: &str, parent: Option<u64>) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            granularity: g,
            period: parse_reference(reference, g).unwrap(),
            parent,
            owner: "ana".into(),
            score: 0,
            status: Status::Pending,
            tags: Vec::new(),
        }
    }

    fn seeded() -> (Database, u64, u64, u64) {
        let mut db = Database::default();
        let mut year = new_task("grow", Granularity::Year, "2025", None);
        year.tags = vec!["Health, focus".into()];
        let y = db.create_task(year).unwrap();
        let q = db
            .create_task(new_task("q3", Granularity::Quarter, "2025-Q3", Some(y)))
            .unwrap();
        let m = db
            .create_task(new_task("july", Granularity::Month, "2025-07", Some(q)))
            .unwrap();
        (db, y, q, m)
    }

    #[test]
    fn test_normalise_tags() {
        let tags = split_and_normalise_tags(&["Deep Work, admin".into(), "admin".into()]);
        assert_eq!(tags, vec!["admin", "deep-work"]);
    }

    #[test]
    fn test_create_inherits_parent_tags() {
        let (db, _, q, m) = seeded();
        assert_eq!(db.get(q).unwrap().tags, vec!["focus", "health"]);
        assert_eq!(db.get(m).unwrap().tags, vec!["focus", "health"]);
        assert_eq!(db.next_task_id(), 4);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (mut db, y, _, _) = seeded();

        let err = db
            .create_task(new_task("skip", Granularity::Month, "2025-08", Some(y)))
            .unwrap_err();
        assert!(matches!(
            err,
            CadenceError::Hierarchy { parent: Granularity::Year, child: Granularity::Month }
        ));

        let mut t = new_task("x", Granularity::Day, "2025-07-01", None);
        t.score = 11;
        assert!(matches!(db.create_task(t).unwrap_err(), CadenceError::InvalidScore(11)));

        let t = new_task("   ", Granularity::Day, "2025-07-01", None);
        assert!(matches!(db.create_task(t).unwrap_err(), CadenceError::EmptyField("title")));

        let t = new_task("x", Granularity::Quarter, "2025-Q4", Some(99));
        assert!(matches!(db.create_task(t).unwrap_err(), CadenceError::TaskNotFound(99)));

        let mut t = new_task("x", Granularity::Quarter, "2025-Q4", Some(y));
        t.owner = "bo".into();
        assert!(matches!(db.create_task(t).unwrap_err(), CadenceError::OwnerMismatch));
    }

    #[test]
    fn test_update_reparent_rules() {
        let (mut db, y, q, m) = seeded();
        let q4 = db
            .create_task(new_task("q4", Granularity::Quarter, "2025-Q4", Some(y)))
            .unwrap();

        let move_to = |p| TaskUpdate { parent: Some(Some(p)), ..TaskUpdate::default() };
        db.update_task(m, "ana", move_to(q4)).unwrap();
        assert_eq!(db.get(m).unwrap().parent, Some(q4));

        assert!(matches!(
            db.update_task(q, "ana", move_to(q)).unwrap_err(),
            CadenceError::Cycle { .. }
        ));
        assert!(matches!(
            db.update_task(q, "ana", move_to(m)).unwrap_err(),
            CadenceError::Hierarchy { .. }
        ));

        db.update_task(m, "ana", TaskUpdate { parent: Some(None), ..TaskUpdate::default() })
            .unwrap();
        assert_eq!(db.get(m).unwrap().parent, None);
    }

    #[test]
    fn test_update_tags_and_score() {
        let (mut db, _, _, m) = seeded();
        db.update_task(
            m,
            "ana",
            TaskUpdate {
                add_tags: vec!["Review".into()],
                rm_tags: vec!["health".into()],
                ..TaskUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(db.get(m).unwrap().tags, vec!["focus", "review"]);

        db.set_score(m, "ana", 7).unwrap();
        assert_eq!(db.get(m).unwrap().score, 7);
        assert!(db.set_score(m, "ana", 12).is_err());
        assert!(matches!(db.set_status(m, "bo", Status::Completed), Err(CadenceError::OwnerMismatch)));
    }

    #[test]
    fn test_update_moves_task_dates() {
        let (mut db, _, _, m) = seeded();
        let moved = parse_reference("2025-08", Granularity::Month).unwrap();
        db.update_task(m, "ana", TaskUpdate { period: Some(moved), ..TaskUpdate::default() })
            .unwrap();
        assert_eq!(db.get(m).unwrap().period, moved);

        // Unaligned dates are accepted.
        let custom = Period::new(
            NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
        )
        .unwrap();
        db.update_task(m, "ana", TaskUpdate { period: Some(custom), ..TaskUpdate::default() })
            .unwrap();
        assert_eq!(db.get(m).unwrap().period, custom);

        let inverted = Period { start: custom.end, end: custom.start };
        let err = db
            .update_task(
                m,
                "ana",
                TaskUpdate {
                    title: Some("renamed".into()),
                    period: Some(inverted),
                    ..TaskUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CadenceError::InvalidPeriod { .. }));
        assert_eq!(db.get(m).unwrap().title, "july");
        assert_eq!(db.get(m).unwrap().period, custom);
    }

    #[test]
    fn test_update_journal_revalidates_reference() {
        let (mut db, ..) = seeded();
        let j = db
            .create_journal(NewJournal {
                content: "draft".into(),
                granularity: Granularity::Month,
                time_reference: "2025-07".into(),
                entry_type: EntryType::Reflection,
                owner: "ana".into(),
                task_ids: Vec::new(),
            })
            .unwrap();

        db.update_journal(
            j,
            "ana",
            JournalUpdate {
                content: Some(" shipped it ".into()),
                entry_type: Some(EntryType::Summary),
                ..JournalUpdate::default()
            },
        )
        .unwrap();
        let entry = db.get_journal(j).unwrap();
        assert_eq!(entry.content, "shipped it");
        assert_eq!(entry.entry_type, EntryType::Summary);
        assert_eq!(entry.time_reference, "2025-07");

        // The old reference is not a quarter label.
        let err = db
            .update_journal(
                j,
                "ana",
                JournalUpdate { granularity: Some(Granularity::Quarter), ..JournalUpdate::default() },
            )
            .unwrap_err();
        assert!(matches!(err, CadenceError::Format { .. }));

        db.update_journal(
            j,
            "ana",
            JournalUpdate {
                granularity: Some(Granularity::Quarter),
                time_reference: Some("2025-Q3".into()),
                ..JournalUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(db.get_journal(j).unwrap().granularity, Granularity::Quarter);

        let empty = JournalUpdate { content: Some("  ".into()), ..JournalUpdate::default() };
        assert!(matches!(db.update_journal(j, "ana", empty), Err(CadenceError::EmptyField("content"))));
        assert!(matches!(
            db.update_journal(j, "bo", JournalUpdate::default()),
            Err(CadenceError::OwnerMismatch)
        ));
    }

    #[test]
    fn test_delete_requires_leaf_and_unlinks_journals() {
        let (mut db, _, q, m) = seeded();
        let j = db
            .create_journal(NewJournal {
                content: "good month".into(),
                granularity: Granularity::Month,
                time_reference: "2025-07".into(),
                entry_type: EntryType::Summary,
                owner: "ana".into(),
                task_ids: vec![m],
            })
            .unwrap();

        assert!(matches!(
            db.delete_task(q, "ana").unwrap_err(),
            CadenceError::HasChildren { count: 1, .. }
        ));
        db.delete_task(m, "ana").unwrap();
        assert!(db.get_journal(j).unwrap().task_ids.is_empty());
        db.delete_task(q, "ana").unwrap();
    }

    #[test]
    fn test_journal_reference_must_parse() {
        let (mut db, ..) = seeded();
        let mut new = NewJournal {
            content: "notes".into(),
            granularity: Granularity::Week,
            time_reference: "2025-07-13~2025-07-19".into(),
            entry_type: EntryType::Reflection,
            owner: "ana".into(),
            task_ids: Vec::new(),
        };
        let id = db.create_journal(new.clone()).unwrap();
        assert_eq!(db.journal_for(id, "ana").unwrap().time_reference, "2025-07-13~2025-07-19");

        new.time_reference = "2025-13".into();
        new.granularity = Granularity::Month;
        assert!(matches!(db.create_journal(new).unwrap_err(), CadenceError::Format { .. }));
    }

    #[test]
    fn test_link_and_queries() {
        let (mut db, y, q, m) = seeded();
        let new = NewJournal {
            content: "q3 kickoff".into(),
            granularity: Granularity::Quarter,
            time_reference: "2025-Q3".into(),
            entry_type: EntryType::PlanStart,
            owner: "ana".into(),
            task_ids: Vec::new(),
        };
        let j = db.create_journal(new).unwrap();
        db.link_journal(j, q, "ana", true).unwrap();
        db.link_journal(j, y, "ana", true).unwrap();
        db.link_journal(j, y, "ana", false).unwrap();
        assert_eq!(db.get_journal(j).unwrap().task_ids, BTreeSet::from([q]));
        assert!(db.link_journal(j, 42, "ana", true).is_err());

        let found = db.journals_by_labels("ana", Granularity::Quarter, &["2025-Q3".into()]);
        assert_eq!(found.len(), 1);
        assert!(db.journals_by_labels("bo", Granularity::Quarter, &["2025-Q3".into()]).is_empty());

        let july = parse_reference("2025-07", Granularity::Month).unwrap();
        let ids: Vec<u64> = db.tasks_in_period("ana", &july, None).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![y, q, m]);
        let months = db.tasks_in_period("ana", &july, Some(Granularity::Month));
        assert_eq!(months.len(), 1);
        assert!(db.tasks_for_owner("bo").is_empty());

        db.delete_journal(j, "ana").unwrap();
        assert!(db.journals_for_owner("ana").is_empty());
    }
}
