//! Notification gateway contract.
//!
//! # Responsibility
//! - Describe how core asks the host platform to schedule, cancel and
//!   immediately present local notifications.
//!
//! # Invariants
//! - Handles returned by `schedule_at` are opaque to core.
//! - `cancel` is idempotent: unknown or already-fired handles are a no-op.

use crate::clock::EpochMs;
use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod memory;

pub use crate::model::reminder::NotificationHandle;

/// Data attached to a notification so a tap can route back to the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub task_id: TaskId,
    pub task_title: String,
}

/// One notification to schedule at an absolute instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub trigger_at: EpochMs,
    pub payload: NotificationPayload,
}

/// Gateway failures surfaced to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The user has not granted notification permission.
    NoPermission,
    /// The platform refused a trigger that is not in the future.
    PastTime { trigger_at: EpochMs },
    /// Any other platform scheduling fault.
    Internal(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPermission => write!(f, "notification permission not granted"),
            Self::PastTime { trigger_at } => {
                write!(f, "cannot schedule notification in the past (trigger_at={trigger_at})")
            }
            Self::Internal(message) => write!(f, "notification gateway error: {message}"),
        }
    }
}

impl Error for GatewayError {}

/// Host platform notification subsystem.
pub trait NotificationGateway {
    /// Schedules a notification and returns its opaque handle.
    fn schedule_at(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationHandle, GatewayError>;

    /// Releases a scheduled notification. Must succeed for unknown handles.
    fn cancel(&self, handle: &NotificationHandle) -> Result<(), GatewayError>;

    /// Shows a notification immediately (in-app heads-up).
    fn present_now(
        &self,
        title: &str,
        body: &str,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError>;
}

impl<G: NotificationGateway + ?Sized> NotificationGateway for &G {
    fn schedule_at(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationHandle, GatewayError> {
        (**self).schedule_at(request)
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<(), GatewayError> {
        (**self).cancel(handle)
    }

    fn present_now(
        &self,
        title: &str,
        body: &str,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError> {
        (**self).present_now(title, body, payload)
    }
}

impl<G: NotificationGateway + ?Sized> NotificationGateway for Arc<G> {
    fn schedule_at(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationHandle, GatewayError> {
        (**self).schedule_at(request)
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<(), GatewayError> {
        (**self).cancel(handle)
    }

    fn present_now(
        &self,
        title: &str,
        body: &str,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError> {
        (**self).present_now(title, body, payload)
    }
}
