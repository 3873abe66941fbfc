use lazytask_core::db::open_db_in_memory;
use lazytask_core::model::task::RecurrenceFrequency;
use lazytask_core::{
    PriorityLabel, RecurrencePattern, RepoError, SqliteTaskRepository, Task, TaskListQuery,
    TaskRepository, TaskStatus, TaskValidationError,
};
use uuid::Uuid;

const NOW: i64 = 1_770_976_800_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

#[test]
fn create_and_get_roundtrip_preserves_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::new("Water plants", NOW);
    task.user_id = Some("user-1".to_string());
    task.description = Some("balcony and kitchen".to_string());
    task.priority = PriorityLabel::High;
    task.due_date = Some(NOW + DAY_MS);
    task.category = Some("home".to_string());
    task.recurrence = Some(RecurrencePattern {
        frequency: RecurrenceFrequency::Weekly,
        interval: 1,
        end_date: None,
        days_of_week: Some(vec![1, 4]),
    });
    repo.create_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[test]
fn numeric_priority_column_mirrors_label() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::new("Book flights", NOW);
    task.priority = PriorityLabel::Low;
    repo.create_task(&task).unwrap();

    let stored: (String, i64) = conn
        .query_row(
            "SELECT priority_label, priority FROM tasks WHERE id = ?1;",
            [task.id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored, ("LOW".to_string(), 1));
}

#[test]
fn create_rejects_invalid_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new("   ", NOW);
    let err = repo.create_task(&task).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::BlankTitle)
    ));
}

#[test]
fn update_and_delete_report_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let ghost = Task::new("ghost", NOW);
    assert!(matches!(
        repo.update_task(&ghost).unwrap_err(),
        RepoError::NotFound { entity: "task", .. }
    ));
    assert!(matches!(
        repo.delete_task(Uuid::new_v4()).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn status_update_persists_completion_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::new("Send invoice", NOW);
    repo.create_task(&task).unwrap();

    task.set_status(TaskStatus::Completed, NOW + 10);
    repo.update_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Completed);
    assert_eq!(loaded.completed_at, Some(NOW + 10));
}

#[test]
fn list_orders_by_priority_then_due_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut low = Task::new("low", NOW);
    low.priority = PriorityLabel::Low;
    let mut high_late = Task::new("high late", NOW);
    high_late.priority = PriorityLabel::High;
    high_late.due_date = Some(NOW + 5 * DAY_MS);
    let mut high_soon = Task::new("high soon", NOW);
    high_soon.priority = PriorityLabel::High;
    high_soon.due_date = Some(NOW + DAY_MS);
    let mut high_undated = Task::new("high undated", NOW);
    high_undated.priority = PriorityLabel::High;

    for task in [&low, &high_late, &high_soon, &high_undated] {
        repo.create_task(task).unwrap();
    }

    let titles: Vec<String> = repo
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["high soon", "high late", "high undated", "low"]);

    let page = repo
        .list_tasks(&TaskListQuery {
            limit: Some(1),
            offset: 1,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "high late");
}

#[test]
fn list_filters_by_status_and_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut mine = Task::new("mine", NOW);
    mine.user_id = Some("alice".to_string());
    let mut done = Task::new("done", NOW);
    done.user_id = Some("alice".to_string());
    done.set_status(TaskStatus::Completed, NOW);
    let theirs = Task::new("theirs", NOW);
    for task in [&mine, &done, &theirs] {
        repo.create_task(task).unwrap();
    }

    let pending_for_alice = repo
        .list_tasks(&TaskListQuery {
            status: Some(TaskStatus::Pending),
            user_id: Some("alice".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(pending_for_alice.len(), 1);
    assert_eq!(pending_for_alice[0].id, mine.id);
}

#[test]
fn corrupt_priority_label_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let task = Task::new("check", NOW);
    repo.create_task(&task).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE tasks SET priority_label = 'URGENT' WHERE id = ?1;",
        [task.id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        repo.get_task(task.id).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}
