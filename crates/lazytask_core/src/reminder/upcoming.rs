//! In-app heads-up for reminders about to fire.
//!
//! # Responsibility
//! - Find the pending reminder that falls inside the look-ahead window.
//! - Track which reminder was surfaced last so a poll does not repeat it.
//!
//! # Invariants
//! - Only `Pending` reminders are ever surfaced.
//! - At most one reminder is surfaced per poll.
//! - Suppression state resets once nothing is upcoming.

use crate::clock::{EpochMs, MINUTE_MS};
use crate::model::reminder::{Reminder, ReminderId};
use crate::model::task::TaskId;
use crate::notify::{GatewayError, NotificationGateway, NotificationPayload};

/// Default look-ahead window for the heads-up.
pub const UPCOMING_WINDOW_MS: EpochMs = 5 * MINUTE_MS;

/// Title of the in-app heads-up notification.
pub const UPCOMING_TITLE: &str = "Upcoming Reminder";

/// Returns the first pending reminder triggering in `(now, now + window]`.
pub fn check_upcoming(reminders: &[Reminder], now: EpochMs, window: EpochMs) -> Option<&Reminder> {
    let horizon = now.saturating_add(window);
    reminders.iter().find(|reminder| {
        reminder.is_pending() && reminder.reminder_time > now && reminder.reminder_time <= horizon
    })
}

/// One poll step as a pure function.
///
/// Returns the reminder to surface now (if any) and the new `last_shown`.
/// A match equal to `last_shown` is not surfaced again; no match resets
/// `last_shown` to `None`.
pub fn poll_upcoming(
    reminders: &[Reminder],
    now: EpochMs,
    window: EpochMs,
    last_shown: Option<ReminderId>,
) -> (Option<&Reminder>, Option<ReminderId>) {
    match check_upcoming(reminders, now, window) {
        Some(reminder) if last_shown == Some(reminder.id) => (None, last_shown),
        Some(reminder) => (Some(reminder), Some(reminder.id)),
        None => (None, None),
    }
}

/// Poll state owned by one watcher (one task-detail view).
#[derive(Debug, Clone)]
pub struct UpcomingWatch {
    window: EpochMs,
    last_shown: Option<ReminderId>,
}

impl Default for UpcomingWatch {
    fn default() -> Self {
        Self::new(UPCOMING_WINDOW_MS)
    }
}

impl UpcomingWatch {
    pub fn new(window: EpochMs) -> Self {
        Self {
            window,
            last_shown: None,
        }
    }

    pub fn last_shown(&self) -> Option<ReminderId> {
        self.last_shown
    }

    /// Runs one poll step and returns a newly surfaced reminder.
    pub fn poll<'a>(&mut self, reminders: &'a [Reminder], now: EpochMs) -> Option<&'a Reminder> {
        let (surfaced, last_shown) = poll_upcoming(reminders, now, self.window, self.last_shown);
        self.last_shown = last_shown;
        surfaced
    }
}

/// Presents the heads-up for `reminder` through the gateway.
///
/// Body is `"<task title>\n<message>"`; the message line is empty when the
/// reminder has none.
pub fn present_heads_up<G: NotificationGateway + ?Sized>(
    gateway: &G,
    task_id: TaskId,
    task_title: &str,
    reminder: &Reminder,
) -> Result<(), GatewayError> {
    let body = format!(
        "{task_title}\n{}",
        reminder.custom_message.as_deref().unwrap_or_default()
    );
    gateway.present_now(
        UPCOMING_TITLE,
        &body,
        &NotificationPayload {
            task_id,
            task_title: task_title.to_string(),
        },
    )
}
