//! Reminder domain model.
//!
//! # Responsibility
//! - Define the reminder record bound to exactly one task.
//! - Carry the opaque notification handle that correlates a reminder to a
//!   scheduled OS notification.
//!
//! # Invariants
//! - A reminder never exists without its owning task.
//! - Trigger time is never edited in place; a new time means delete + recreate.
//! - The only transition core code performs is `Pending -> Sent`.
//!   Cancelling deletes the row; `Cancelled` is a read-only status kept for
//!   rows written by other clients, and such rows never become `Sent`.

use crate::clock::EpochMs;
use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a reminder.
pub type ReminderId = Uuid;

/// Reminder delivery state.
///
/// Core code never writes `Cancelled`; it only reads it from stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Cancelled,
}

impl ReminderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Opaque token returned by a notification gateway.
///
/// The format is owned by the gateway; core code only stores and echoes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scheduled notification bound to one task and one trigger instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub task_id: TaskId,
    /// Absolute trigger instant.
    pub reminder_time: EpochMs,
    pub status: ReminderStatus,
    pub custom_message: Option<String>,
    pub notification_handle: Option<NotificationHandle>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

impl Reminder {
    /// Creates a pending reminder with a generated stable ID.
    ///
    /// `custom_message` is normalized with `normalize_message`.
    pub fn new_pending(
        task_id: TaskId,
        reminder_time: EpochMs,
        custom_message: Option<&str>,
        notification_handle: Option<NotificationHandle>,
        now: EpochMs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            reminder_time,
            status: ReminderStatus::Pending,
            custom_message: normalize_message(custom_message),
            notification_handle,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReminderStatus::Pending
    }
}

/// Trims a custom message; blank input becomes `None`.
pub fn normalize_message(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
