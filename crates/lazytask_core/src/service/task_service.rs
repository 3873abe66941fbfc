//! Task use-case service.
//!
//! # Responsibility
//! - Create and edit tasks with a fresh priority classification.
//! - Delete tasks without orphaning scheduled reminder notifications.
//!
//! # Invariants
//! - Every create/edit path stores the label chosen by the inference engine
//!   unless the caller overrides it explicitly with `set_priority`.
//! - `delete_task` releases all reminder handles before the task row (and
//!   its cascaded reminder rows) is removed.

use crate::clock::{Clock, EpochMs};
use crate::inference::LanguageModelClient;
use crate::model::priority::{PriorityDecision, PriorityLabel};
use crate::model::task::{RecurrencePattern, Task, TaskId, TaskStatus};
use crate::notify::{GatewayError, NotificationGateway};
use crate::priority::PriorityInferenceEngine;
use crate::reminder::ReminderScheduler;
use crate::repo::reminder_repo::ReminderStore;
use crate::repo::task_repo::{RepoError, TaskListQuery, TaskRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User-editable task fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<EpochMs>,
    pub category: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
    pub user_id: Option<String>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub enum TaskServiceError {
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// A reminder handle could not be released; nothing was deleted.
    Gateway(GatewayError),
    /// Repository-level failure, including validation.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Gateway(err) => write!(f, "failed to release reminder notification: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskNotFound(_) => None,
            Self::Gateway(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "task",
                id,
            } => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<GatewayError> for TaskServiceError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Task CRUD with priority classification.
pub struct TaskService<R: TaskRepository, M: LanguageModelClient, C: Clock> {
    repo: R,
    engine: PriorityInferenceEngine<M, C>,
}

impl<R: TaskRepository, M: LanguageModelClient, C: Clock> TaskService<R, M, C> {
    pub fn new(repo: R, engine: PriorityInferenceEngine<M, C>) -> Self {
        Self { repo, engine }
    }

    pub fn engine(&self) -> &PriorityInferenceEngine<M, C> {
        &self.engine
    }

    /// Creates a task and classifies its priority.
    pub fn create_task(&self, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let now = self.engine.clock().now_ms();
        let mut task = Task::new(String::new(), now);
        apply_draft(&mut task, draft);
        task.validate().map_err(RepoError::from)?;

        let decision = self.engine.decide(&task);
        task.priority = decision.label;
        self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} priority={} source={}",
            task.id,
            task.priority,
            decision.source.as_str()
        );
        Ok(task)
    }

    /// Replaces the editable fields of a task and reclassifies it.
    pub fn edit_task(&self, id: TaskId, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(id)?;
        apply_draft(&mut task, draft);
        task.validate().map_err(RepoError::from)?;

        task.priority = self.engine.decide(&task).label;
        task.updated_at = self.engine.clock().now_ms();
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Re-runs classification for a stored task and persists the result.
    pub fn reclassify(&self, id: TaskId) -> Result<PriorityDecision, TaskServiceError> {
        let mut task = self.get_task(id)?;
        let decision = self.engine.decide(&task);
        if decision.label != task.priority {
            task.priority = decision.label;
            task.updated_at = self.engine.clock().now_ms();
            self.repo.update_task(&task)?;
        }
        Ok(decision)
    }

    /// Stores a user-chosen priority without consulting the engine.
    pub fn set_priority(&self, id: TaskId, label: PriorityLabel) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(id)?;
        task.priority = label;
        task.updated_at = self.engine.clock().now_ms();
        self.repo.update_task(&task)?;
        Ok(task)
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(id)?;
        task.set_status(status, self.engine.clock().now_ms());
        self.repo.update_task(&task)?;
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(query)?)
    }

    /// Deletes a task after releasing the handles of all its reminders.
    ///
    /// On a gateway failure nothing is deleted and the caller may retry.
    pub fn delete_task<G, S, SC>(
        &self,
        id: TaskId,
        scheduler: &ReminderScheduler<G, S, SC>,
    ) -> Result<(), TaskServiceError>
    where
        G: NotificationGateway,
        S: ReminderStore,
        SC: Clock,
    {
        let reminders = scheduler.store().list_by_task(id)?;
        let released = scheduler.release_handles(&reminders)?;
        self.repo.delete_task(id)?;
        info!(
            "event=task_delete module=service status=ok task_id={id} reminders={} released_handles={released}",
            reminders.len()
        );
        Ok(())
    }
}

fn apply_draft(task: &mut Task, draft: TaskDraft) {
    task.title = draft.title.trim().to_string();
    task.description = non_blank(draft.description);
    task.due_date = draft.due_date;
    task.category = non_blank(draft.category);
    task.recurrence = draft.recurrence;
    task.user_id = non_blank(draft.user_id);
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
