//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record owned by one user.
//! - Provide lifecycle helpers for status transitions (completion toggles).
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is never blank.
//! - `completed_at` is set only while `status == Completed`.
//! - `recurrence` is stored verbatim and never interpreted by scheduling.

use crate::clock::EpochMs;
use crate::model::priority::PriorityLabel;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Recurrence frequency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Recurrence descriptor reserved for future expansion.
///
/// Stored and round-tripped; reminder scheduling never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub frequency: RecurrenceFrequency,
    /// Repeat every `interval` units. Must be >= 1.
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<EpochMs>,
    /// Weekdays `0..=6`, Sunday first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
}

/// Task validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
    InvalidRecurrenceInterval(u32),
    InvalidWeekday(u8),
    CompletedAtWithoutCompletion,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::InvalidRecurrenceInterval(value) => {
                write!(f, "recurrence interval must be >= 1, got {value}")
            }
            Self::InvalidWeekday(value) => {
                write!(f, "recurrence weekday must be within 0..=6, got {value}")
            }
            Self::CompletedAtWithoutCompletion => {
                write!(f, "completed_at is only allowed for completed tasks")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Owning user, when the embedding app tracks one.
    pub user_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Authoritative priority. Use `numeric_priority()` for the 1..=3 view.
    pub priority: PriorityLabel,
    pub status: TaskStatus,
    pub due_date: Option<EpochMs>,
    pub category: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
    pub completed_at: Option<EpochMs>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

impl Task {
    /// Creates a pending task with a generated stable ID and default priority.
    pub fn new(title: impl Into<String>, now: EpochMs) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            title: title.into(),
            description: None,
            priority: PriorityLabel::default(),
            status: TaskStatus::Pending,
            due_date: None,
            category: None,
            recurrence: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if let Some(recurrence) = &self.recurrence {
            if recurrence.interval == 0 {
                return Err(TaskValidationError::InvalidRecurrenceInterval(0));
            }
            if let Some(day) = recurrence
                .days_of_week
                .iter()
                .flatten()
                .find(|day| **day > 6)
            {
                return Err(TaskValidationError::InvalidWeekday(*day));
            }
        }
        if self.completed_at.is_some() && self.status != TaskStatus::Completed {
            return Err(TaskValidationError::CompletedAtWithoutCompletion);
        }
        Ok(())
    }

    /// Applies a status transition and keeps `completed_at` consistent.
    pub fn set_status(&mut self, status: TaskStatus, now: EpochMs) {
        if status == self.status {
            return;
        }
        self.completed_at = match status {
            TaskStatus::Completed => Some(now),
            _ => None,
        };
        self.status = status;
        self.updated_at = now;
    }

    /// Numeric projection of `priority` (1=LOW, 2=MEDIUM, 3=HIGH).
    pub fn numeric_priority(&self) -> u8 {
        self.priority.as_numeric()
    }
}
