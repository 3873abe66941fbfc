//! Core domain logic for LazyTask.
//! This crate is the single source of truth for task, reminder and priority
//! invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod inference;
pub mod logging;
pub mod model;
pub mod notify;
pub mod priority;
pub mod reminder;
pub mod repo;
pub mod service;

pub use clock::{Clock, EpochMs, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use inference::{
    assistant_reply, AssistantError, ChatMessage, ChatRole, GenerationParams, HuggingFaceClient,
    LanguageModelClient, ModelError,
};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::priority::{PriorityDecision, PriorityLabel, PrioritySource};
pub use model::reminder::{NotificationHandle, Reminder, ReminderId, ReminderStatus};
pub use model::task::{RecurrencePattern, Task, TaskId, TaskStatus, TaskValidationError};
pub use notify::memory::InMemoryNotificationGateway;
pub use notify::{GatewayError, NotificationGateway, NotificationPayload, NotificationRequest};
pub use priority::PriorityInferenceEngine;
pub use reminder::{
    check_upcoming, CancelError, ReminderScheduler, ReminderValidationError, ScheduleError,
    UpcomingPoller, UpcomingWatch,
};
pub use repo::reminder_repo::{ReminderStore, SqliteReminderStore};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use service::task_service::{TaskDraft, TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
