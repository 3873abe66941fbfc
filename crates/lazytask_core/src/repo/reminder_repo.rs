//! Reminder store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable create/delete/list for reminder records.
//! - Record the `pending -> sent` transition when a notification fires.
//!
//! # Invariants
//! - `list_by_task` is ordered by ascending trigger time.
//! - Inserting a reminder for a missing task fails (foreign key).
//! - The store never talks to the notification gateway; releasing handles is
//!   the scheduler's job.

use crate::clock::EpochMs;
use crate::model::reminder::{NotificationHandle, Reminder, ReminderId, ReminderStatus};
use crate::model::task::TaskId;
use crate::repo::task_repo::{parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    reminder_time,
    status,
    custom_message,
    notification_id,
    created_at,
    updated_at
FROM reminders";

/// Durable CRUD for reminder records.
pub trait ReminderStore {
    /// Persists a new reminder and returns the stored row.
    fn create(&self, reminder: &Reminder) -> RepoResult<Reminder>;
    /// Removes one reminder record.
    fn delete(&self, id: ReminderId) -> RepoResult<()>;
    /// Lists reminders of one task, ascending by trigger time.
    fn list_by_task(&self, task_id: TaskId) -> RepoResult<Vec<Reminder>>;
    /// Marks a pending reminder as sent. Already-sent rows are left as is.
    fn mark_sent(&self, id: ReminderId, at: EpochMs) -> RepoResult<()>;
}

impl<S: ReminderStore + ?Sized> ReminderStore for &S {
    fn create(&self, reminder: &Reminder) -> RepoResult<Reminder> {
        (**self).create(reminder)
    }

    fn delete(&self, id: ReminderId) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn list_by_task(&self, task_id: TaskId) -> RepoResult<Vec<Reminder>> {
        (**self).list_by_task(task_id)
    }

    fn mark_sent(&self, id: ReminderId, at: EpochMs) -> RepoResult<()> {
        (**self).mark_sent(id, at)
    }
}

/// SQLite-backed reminder store.
pub struct SqliteReminderStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Gets one reminder by ID.
    pub fn get(&self, id: ReminderId) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }
        Ok(None)
    }
}

impl ReminderStore for SqliteReminderStore<'_> {
    fn create(&self, reminder: &Reminder) -> RepoResult<Reminder> {
        self.conn.execute(
            "INSERT INTO reminders (
                id,
                task_id,
                reminder_time,
                status,
                custom_message,
                notification_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                reminder.id.to_string(),
                reminder.task_id.to_string(),
                reminder.reminder_time,
                reminder.status.as_str(),
                reminder.custom_message.as_deref(),
                reminder.notification_handle.as_ref().map(NotificationHandle::as_str),
                reminder.created_at,
                reminder.updated_at,
            ],
        )?;

        self.get(reminder.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created reminder {} missing on read-back", reminder.id))
        })
    }

    fn delete(&self, id: ReminderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "reminder",
                id,
            });
        }

        Ok(())
    }

    fn list_by_task(&self, task_id: TaskId) -> RepoResult<Vec<Reminder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REMINDER_SELECT_SQL}
             WHERE task_id = ?1
             ORDER BY reminder_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut reminders = Vec::new();

        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }

        Ok(reminders)
    }

    fn mark_sent(&self, id: ReminderId, at: EpochMs) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reminders
             SET status = 'sent', updated_at = ?2
             WHERE id = ?1 AND status = 'pending';",
            params![id.to_string(), at],
        )?;
        if changed > 0 {
            return Ok(());
        }

        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM reminders WHERE id = ?1;",
                [id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        match exists {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound {
                entity: "reminder",
                id,
            }),
        }
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let id = parse_uuid_column(row, "id", "reminders.id")?;
    let task_id = parse_uuid_column(row, "task_id", "reminders.task_id")?;

    let status_text: String = row.get("status")?;
    let status = ReminderStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid reminder status `{status_text}` in reminders.status"
        ))
    })?;

    Ok(Reminder {
        id,
        task_id,
        reminder_time: row.get("reminder_time")?,
        status,
        custom_message: row.get("custom_message")?,
        notification_handle: row
            .get::<_, Option<String>>("notification_id")?
            .map(NotificationHandle::new),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
