//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `tasks` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `priority_label` is authoritative; `priority` is its numeric projection.

use crate::db::DbError;
use crate::model::priority::PriorityLabel;
use crate::model::task::{RecurrencePattern, Task, TaskId, TaskStatus, TaskValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    priority_label,
    status,
    due_date,
    category,
    recurring_pattern,
    completed_at,
    created_at,
    updated_at
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by task and reminder persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub user_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists tasks by priority (high first), then due date (none last).
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Hard-deletes a task; its reminder rows cascade.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        (**self).create_task(task)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        (**self).update_task(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_task(id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        (**self).list_tasks(query)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        (**self).delete_task(id)
    }
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        let recurrence = encode_recurrence(task.recurrence.as_ref())?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                user_id,
                title,
                description,
                priority_label,
                priority,
                status,
                due_date,
                category,
                recurring_pattern,
                completed_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                task.id.to_string(),
                task.user_id.as_deref(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                task.numeric_priority(),
                task.status.as_str(),
                task.due_date,
                task.category.as_deref(),
                recurrence,
                task.completed_at,
                task.created_at,
                task.updated_at,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let recurrence = encode_recurrence(task.recurrence.as_ref())?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                user_id = ?1,
                title = ?2,
                description = ?3,
                priority_label = ?4,
                priority = ?5,
                status = ?6,
                due_date = ?7,
                category = ?8,
                recurring_pattern = ?9,
                completed_at = ?10,
                updated_at = ?11
             WHERE id = ?12;",
            params![
                task.user_id.as_deref(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                task.numeric_priority(),
                task.status.as_str(),
                task.due_date,
                task.category.as_deref(),
                recurrence,
                task.completed_at,
                task.updated_at,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(user_id) = &query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.clone()));
        }

        sql.push_str(" ORDER BY priority DESC, due_date ASC NULLS LAST, created_at ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id = parse_uuid_column(row, "id", "tasks.id")?;

    let label_text: String = row.get("priority_label")?;
    let priority = PriorityLabel::parse_label(&label_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{label_text}` in tasks.priority_label"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let recurrence = match row.get::<_, Option<String>>("recurring_pattern")? {
        Some(json) => Some(
            serde_json::from_str::<RecurrencePattern>(&json).map_err(|err| {
                RepoError::InvalidData(format!("invalid tasks.recurring_pattern: {err}"))
            })?,
        ),
        None => None,
    };

    let task = Task {
        id,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        status,
        due_date: row.get("due_date")?,
        category: row.get("category")?,
        recurrence,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn encode_recurrence(recurrence: Option<&RecurrencePattern>) -> RepoResult<Option<String>> {
    recurrence
        .map(|pattern| {
            serde_json::to_string(pattern).map_err(|err| {
                RepoError::InvalidData(format!("failed to encode recurrence pattern: {err}"))
            })
        })
        .transpose()
}

/// Reads a UUID stored as text, reporting the column on failure.
pub(crate) fn parse_uuid_column(
    row: &Row<'_>,
    column: &str,
    qualified: &str,
) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {qualified}")))
}
