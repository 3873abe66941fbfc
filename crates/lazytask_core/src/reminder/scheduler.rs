//! Reminder lifecycle orchestration.
//!
//! # Responsibility
//! - Validate, schedule and persist new reminders for one task.
//! - Release notification handles before reminder records disappear.
//! - Record the `pending -> sent` transition when a notification fires.
//!
//! # Invariants
//! - `schedule` calls the gateway before the store; when the store fails, the
//!   freshly issued handle is cancelled before the error is returned.
//! - `cancel` never deletes a record whose handle the gateway refused to
//!   release.
//! - Titles and messages stay out of log lines.

use crate::clock::{Clock, EpochMs};
use crate::model::reminder::{normalize_message, Reminder, ReminderStatus};
use crate::model::task::Task;
use crate::notify::{GatewayError, NotificationGateway, NotificationPayload, NotificationRequest};
use crate::reminder::validate::{validate_reminder_time, ReminderValidationError};
use crate::repo::reminder_repo::ReminderStore;
use crate::repo::task_repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title of every scheduled reminder notification.
pub const REMINDER_TITLE: &str = "Task Reminder";

/// `schedule` failures.
#[derive(Debug)]
pub enum ScheduleError {
    Validation(ReminderValidationError),
    Gateway(GatewayError),
    Store(RepoError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Gateway(err) => write!(f, "failed to schedule notification: {err}"),
            Self::Store(err) => write!(f, "failed to save reminder: {err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ReminderValidationError> for ScheduleError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GatewayError> for ScheduleError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// `cancel` failures.
#[derive(Debug)]
pub enum CancelError {
    /// Handle release failed; the record was left untouched.
    Gateway(GatewayError),
    /// Handle released but the record could not be deleted.
    Store(RepoError),
}

impl Display for CancelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gateway(err) => write!(f, "failed to cancel notification: {err}"),
            Self::Store(err) => write!(f, "failed to delete reminder: {err}"),
        }
    }
}

impl Error for CancelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<GatewayError> for CancelError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<RepoError> for CancelError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Coordinates the notification gateway and the reminder store.
pub struct ReminderScheduler<G: NotificationGateway, S: ReminderStore, C: Clock> {
    gateway: G,
    store: S,
    clock: C,
}

impl<G: NotificationGateway, S: ReminderStore, C: Clock> ReminderScheduler<G, S, C> {
    pub fn new(gateway: G, store: S, clock: C) -> Self {
        Self {
            gateway,
            store,
            clock,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now_ms(&self) -> EpochMs {
        self.clock.now_ms()
    }

    /// Validates `candidate` against the current time and `existing`.
    pub fn validate(
        &self,
        candidate: EpochMs,
        existing: &[Reminder],
    ) -> Result<(), ReminderValidationError> {
        validate_reminder_time(candidate, existing, self.clock.now_ms())
    }

    /// Schedules a reminder for `task` at `candidate`.
    ///
    /// `existing` is the reminder list the caller knows about; spacing is
    /// checked only against it. Use [`Self::schedule_fresh`] to re-read the
    /// store first.
    ///
    /// # Errors
    /// - [`ScheduleError::Validation`] before any side effect.
    /// - [`ScheduleError::Gateway`] when the notification was not scheduled.
    /// - [`ScheduleError::Store`] after the issued handle has been released.
    pub fn schedule(
        &self,
        task: &Task,
        candidate: EpochMs,
        message: Option<&str>,
        existing: &[Reminder],
    ) -> Result<Reminder, ScheduleError> {
        if let Err(err) = self.validate(candidate, existing) {
            info!(
                "event=reminder_schedule module=reminder status=rejected task_id={} reason={}",
                task.id,
                err.code()
            );
            return Err(err.into());
        }

        let message = normalize_message(message);
        let request = NotificationRequest {
            title: REMINDER_TITLE.to_string(),
            body: notification_body(&task.title, message.as_deref()),
            trigger_at: candidate,
            payload: NotificationPayload {
                task_id: task.id,
                task_title: task.title.clone(),
            },
        };

        let handle = self.gateway.schedule_at(&request).map_err(|err| {
            warn!(
                "event=reminder_schedule module=reminder status=error task_id={} stage=gateway error={err}",
                task.id
            );
            ScheduleError::Gateway(err)
        })?;

        let reminder = Reminder::new_pending(
            task.id,
            candidate,
            message.as_deref(),
            Some(handle.clone()),
            self.clock.now_ms(),
        );

        match self.store.create(&reminder) {
            Ok(stored) => {
                info!(
                    "event=reminder_schedule module=reminder status=ok task_id={} reminder_id={} trigger_at={candidate}",
                    task.id, stored.id
                );
                Ok(stored)
            }
            Err(store_err) => {
                if let Err(cancel_err) = self.gateway.cancel(&handle) {
                    error!(
                        "event=reminder_compensate module=reminder status=error task_id={} handle={handle} error={cancel_err}",
                        task.id
                    );
                } else {
                    warn!(
                        "event=reminder_compensate module=reminder status=ok task_id={} handle={handle}",
                        task.id
                    );
                }
                Err(ScheduleError::Store(store_err))
            }
        }
    }

    /// Re-reads the task's reminders from the store, then schedules.
    pub fn schedule_fresh(
        &self,
        task: &Task,
        candidate: EpochMs,
        message: Option<&str>,
    ) -> Result<Reminder, ScheduleError> {
        let existing = self.store.list_by_task(task.id)?;
        self.schedule(task, candidate, message, &existing)
    }

    /// Releases the reminder's handle, then deletes its record.
    ///
    /// Releasing an already-fired or unknown handle is a no-op in the
    /// gateway, so cancelling twice only fails at the store step.
    pub fn cancel(&self, reminder: &Reminder) -> Result<(), CancelError> {
        if let Some(handle) = &reminder.notification_handle {
            self.gateway.cancel(handle).map_err(|err| {
                warn!(
                    "event=reminder_cancel module=reminder status=error reminder_id={} stage=gateway error={err}",
                    reminder.id
                );
                CancelError::Gateway(err)
            })?;
        }

        self.store.delete(reminder.id).map_err(|err| {
            warn!(
                "event=reminder_cancel module=reminder status=error reminder_id={} stage=store error={err}",
                reminder.id
            );
            CancelError::Store(err)
        })?;

        info!(
            "event=reminder_cancel module=reminder status=ok reminder_id={}",
            reminder.id
        );
        Ok(())
    }

    /// Releases every handle in `reminders` without touching the store.
    ///
    /// Used before a task row is deleted and its reminders cascade away.
    /// Stops at the first gateway failure.
    pub fn release_handles(&self, reminders: &[Reminder]) -> Result<usize, GatewayError> {
        let mut released = 0;
        for handle in reminders
            .iter()
            .filter_map(|reminder| reminder.notification_handle.as_ref())
        {
            self.gateway.cancel(handle)?;
            released += 1;
        }
        Ok(released)
    }

    /// Records that the reminder's notification was delivered.
    ///
    /// Non-pending reminders are returned unchanged.
    pub fn mark_fired(&self, reminder: &Reminder) -> Result<Reminder, RepoError> {
        if !reminder.is_pending() {
            return Ok(reminder.clone());
        }
        let now = self.clock.now_ms();
        self.store.mark_sent(reminder.id, now)?;
        info!(
            "event=reminder_fired module=reminder status=ok reminder_id={}",
            reminder.id
        );

        let mut fired = reminder.clone();
        fired.status = ReminderStatus::Sent;
        fired.updated_at = now;
        Ok(fired)
    }
}

/// `"<task title>\n<message>"`, or just the title without a message.
pub(crate) fn notification_body(task_title: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{task_title}\n{message}"),
        None => task_title.to_string(),
    }
}
