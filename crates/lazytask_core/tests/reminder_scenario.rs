//! End-to-end: classify a task through the fallback, then schedule reminders.

use lazytask_core::clock::{DAY_MS, HOUR_MS, MINUTE_MS};
use lazytask_core::db::open_db_in_memory;
use lazytask_core::reminder::UpcomingWatch;
use lazytask_core::{
    FixedClock, InMemoryNotificationGateway, LanguageModelClient, ModelError,
    PriorityInferenceEngine, PriorityLabel, ReminderScheduler, ReminderStore,
    ReminderValidationError, ScheduleError, SqliteReminderStore, SqliteTaskRepository, TaskDraft,
    TaskService,
};

const NOW: i64 = 1_770_976_800_000;

struct UnreachableModel;

impl LanguageModelClient for UnreachableModel {
    fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Network("dns lookup failed".to_string()))
    }
}

#[test]
fn fallback_high_then_spacing_rejects_second_reminder() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::new(NOW);
    let service = TaskService::new(
        SqliteTaskRepository::new(&conn),
        PriorityInferenceEngine::new(Some(UnreachableModel), &clock),
    );
    let gateway = InMemoryNotificationGateway::new(&clock);
    let scheduler = ReminderScheduler::new(&gateway, SqliteReminderStore::new(&conn), &clock);

    let task = service
        .create_task(TaskDraft {
            due_date: Some(NOW + DAY_MS),
            ..TaskDraft::titled("Submit grant report")
        })
        .unwrap();
    assert_eq!(task.category, None);
    assert_eq!(task.priority, PriorityLabel::High);

    let first = scheduler
        .schedule_fresh(&task, NOW + 2 * HOUR_MS, None)
        .unwrap();
    let err = scheduler
        .schedule_fresh(&task, NOW + 2 * HOUR_MS + 30 * MINUTE_MS, None)
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::Validation(ReminderValidationError::TooCloseToExisting { existing })
            if existing == first.id
    ));
    assert_eq!(gateway.outstanding_handles().len(), 1);

    // Heads-up surfaces three minutes before the trigger, once.
    clock.set(NOW + 2 * HOUR_MS - 3 * MINUTE_MS);
    let reminders = scheduler.store().list_by_task(task.id).unwrap();
    let mut watch = UpcomingWatch::default();
    assert_eq!(
        watch.poll(&reminders, NOW + 2 * HOUR_MS - 3 * MINUTE_MS).map(|r| r.id),
        Some(first.id)
    );
    assert!(watch.poll(&reminders, NOW + 2 * HOUR_MS - 2 * MINUTE_MS).is_none());
}
