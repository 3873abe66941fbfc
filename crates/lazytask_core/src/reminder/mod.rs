//! Reminder scheduling, validation and in-app heads-up polling.
//!
//! # Responsibility
//! - Decide whether a proposed reminder time is acceptable.
//! - Keep notification gateway state and reminder records from diverging.
//! - Surface the next upcoming reminder for an in-app heads-up.
//!
//! # Invariants
//! - Gateway scheduling happens before persistence; the compensating cancel
//!   runs only after a persistence failure.
//! - A reminder record is removed only after its handle was released.

pub mod poller;
pub mod scheduler;
pub mod upcoming;
pub mod validate;

pub use poller::{ReminderSource, UpcomingPoller, WatchedTask};
pub use scheduler::{CancelError, ReminderScheduler, ScheduleError, REMINDER_TITLE};
pub use upcoming::{
    check_upcoming, poll_upcoming, present_heads_up, UpcomingWatch, UPCOMING_TITLE,
    UPCOMING_WINDOW_MS,
};
pub use validate::{
    validate_reminder_time, ReminderValidationError, MAX_LEAD_TIME_MS, MIN_SPACING_MS,
};
