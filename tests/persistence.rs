//! Database save/load behaviour against real files.

use cadence::calendar::parse_reference;
use cadence::db::{Database, NewJournal, NewTask};
use cadence::fields::{EntryType, Granularity, Status};
use cadence::CadenceError;

fn month_task(title: &str, reference: &str) -> NewTask {
    NewTask {
        title: title.into(),
        description: Some("details".into()),
        granularity: Granularity::Month,
        period: parse_reference(reference, Granularity::Month).unwrap(),
        parent: None,
        owner: "ana".into(),
        score: 3,
        status: Status::InProgress,
        tags: vec!["Deep Work".into()],
    }
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = Database::load(&dir.path().join("tasks.json")).unwrap();
    assert!(db.tasks.is_empty());
    assert!(db.journals.is_empty());
}

#[test]
fn tasks_and_journals_survive_reload() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tasks.json");

    {
        let mut db = Database::default();
        let id = db.create_task(month_task("launch", "2025-07")).unwrap();
        db.create_journal(NewJournal {
            content: "kicked off".into(),
            granularity: Granularity::Month,
            time_reference: "2025-07".into(),
            entry_type: EntryType::PlanStart,
            owner: "ana".into(),
            task_ids: vec![id],
        })
        .unwrap();
        db.save(&path).unwrap();
    }

    let db = Database::load(&path).unwrap();
    assert_eq!(db.tasks.len(), 1);
    let task = &db.tasks[0];
    assert_eq!(task.title, "launch");
    assert_eq!(task.tags, vec!["deep-work"]);
    assert_eq!(task.period, parse_reference("2025-07", Granularity::Month).unwrap());
    assert_eq!(task.status, Status::InProgress);

    let journal = &db.journals[0];
    assert_eq!(journal.entry_type, EntryType::PlanStart);
    assert!(journal.task_ids.contains(&task.id));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn next_id_follows_highest_remaining_after_reload() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");

    let mut db = Database::default();
    db.create_task(month_task("a", "2025-07")).unwrap();
    let b = db.create_task(month_task("b", "2025-08")).unwrap();
    db.save(&path).unwrap();

    let mut db = Database::load(&path).unwrap();
    db.delete_task(b, "ana").unwrap();
    let c = db.create_task(month_task("c", "2025-09")).unwrap();
    assert_eq!(c, 2);
}

#[test]
fn corrupt_file_is_an_error_not_a_reset() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Database::load(&path), Err(CadenceError::Json(_))));
}
