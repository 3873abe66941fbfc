//! Reminder time validation.
//!
//! Rules apply in order and the first failure wins:
//! 1. candidate `<= now` is in the past.
//! 2. candidate `> now + 14 days` is too far ahead.
//! 3. candidate within one hour (exclusive) of any non-cancelled reminder
//!    is too close.

use crate::clock::{EpochMs, DAY_MS, HOUR_MS};
use crate::model::reminder::{Reminder, ReminderId, ReminderStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Furthest a reminder may be scheduled ahead of now.
pub const MAX_LEAD_TIME_MS: EpochMs = 14 * DAY_MS;
/// Minimum distance between two reminders of the same task.
pub const MIN_SPACING_MS: EpochMs = HOUR_MS;

/// User-correctable reminder time rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    PastTime,
    TooFarInFuture,
    /// Conflicts with the reminder `existing`.
    TooCloseToExisting { existing: ReminderId },
}

impl ReminderValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PastTime => "past_time",
            Self::TooFarInFuture => "too_far_in_future",
            Self::TooCloseToExisting { .. } => "too_close_to_existing",
        }
    }
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PastTime => write!(f, "reminder time must be in the future"),
            Self::TooFarInFuture => {
                write!(f, "reminder cannot be set more than 14 days in advance")
            }
            Self::TooCloseToExisting { .. } => {
                write!(f, "reminders must be at least 1 hour apart")
            }
        }
    }
}

impl Error for ReminderValidationError {}

/// Checks `candidate` against `now` and the task's existing reminders.
pub fn validate_reminder_time(
    candidate: EpochMs,
    existing: &[Reminder],
    now: EpochMs,
) -> Result<(), ReminderValidationError> {
    if candidate <= now {
        return Err(ReminderValidationError::PastTime);
    }
    if candidate > now.saturating_add(MAX_LEAD_TIME_MS) {
        return Err(ReminderValidationError::TooFarInFuture);
    }

    let conflict = existing
        .iter()
        .filter(|reminder| reminder.status != ReminderStatus::Cancelled)
        .find(|reminder| {
            candidate.abs_diff(reminder.reminder_time) < MIN_SPACING_MS.unsigned_abs()
        });
    if let Some(reminder) = conflict {
        return Err(ReminderValidationError::TooCloseToExisting {
            existing: reminder.id,
        });
    }

    Ok(())
}
