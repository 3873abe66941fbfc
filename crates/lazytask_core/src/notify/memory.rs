//! In-process notification gateway.
//!
//! Keeps scheduled notifications in memory and hands them out when due.
//! Used by headless hosts and as a reference gateway in tests.

use super::{
    GatewayError, NotificationGateway, NotificationHandle, NotificationPayload,
    NotificationRequest,
};
use crate::clock::{Clock, EpochMs};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

const HANDLE_PREFIX: &str = "local-";

/// Notification shown immediately through `present_now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedNotification {
    pub title: String,
    pub body: String,
    pub payload: NotificationPayload,
}

#[derive(Debug)]
struct GatewayState {
    permission_granted: bool,
    next_id: u64,
    scheduled: BTreeMap<NotificationHandle, NotificationRequest>,
    presented: Vec<PresentedNotification>,
}

/// Gateway holding scheduled notifications in a map keyed by handle.
#[derive(Debug)]
pub struct InMemoryNotificationGateway<C: Clock> {
    clock: C,
    state: Mutex<GatewayState>,
}

impl<C: Clock> InMemoryNotificationGateway<C> {
    /// Creates a gateway with permission granted.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: Mutex::new(GatewayState {
                permission_granted: true,
                next_id: 1,
                scheduled: BTreeMap::new(),
                presented: Vec::new(),
            }),
        }
    }

    /// Simulates the user granting or revoking notification permission.
    pub fn set_permission_granted(&self, granted: bool) {
        self.lock().permission_granted = granted;
    }

    /// Handles of notifications still waiting to fire.
    pub fn outstanding_handles(&self) -> Vec<NotificationHandle> {
        self.lock().scheduled.keys().cloned().collect()
    }

    pub fn is_scheduled(&self, handle: &NotificationHandle) -> bool {
        self.lock().scheduled.contains_key(handle)
    }

    /// Removes and returns every notification whose trigger is `<= now`.
    ///
    /// Returned entries are ordered by trigger time.
    pub fn take_due(&self, now: EpochMs) -> Vec<(NotificationHandle, NotificationRequest)> {
        let mut state = self.lock();
        let due_handles: Vec<NotificationHandle> = state
            .scheduled
            .iter()
            .filter(|(_, request)| request.trigger_at <= now)
            .map(|(handle, _)| handle.clone())
            .collect();

        let mut due: Vec<(NotificationHandle, NotificationRequest)> = due_handles
            .into_iter()
            .filter_map(|handle| {
                let request = state.scheduled.remove(&handle)?;
                Some((handle, request))
            })
            .collect();
        due.sort_by_key(|(_, request)| request.trigger_at);
        due
    }

    /// Heads-up notifications presented and not yet drained.
    pub fn presented(&self) -> Vec<PresentedNotification> {
        self.lock().presented.clone()
    }

    /// Removes and returns the presented heads-ups, oldest first.
    ///
    /// Long-running hosts call this after displaying them so the list stays
    /// bounded.
    pub fn take_presented(&self) -> Vec<PresentedNotification> {
        std::mem::take(&mut self.lock().presented)
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        // Poisoning leaves the maps structurally valid.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock> NotificationGateway for InMemoryNotificationGateway<C> {
    fn schedule_at(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationHandle, GatewayError> {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        if !state.permission_granted {
            return Err(GatewayError::NoPermission);
        }
        if request.trigger_at <= now {
            return Err(GatewayError::PastTime {
                trigger_at: request.trigger_at,
            });
        }

        let handle = NotificationHandle::new(format!("{HANDLE_PREFIX}{}", state.next_id));
        state.next_id += 1;
        state.scheduled.insert(handle.clone(), request.clone());
        info!(
            "event=notification_schedule module=notify status=ok handle={handle} trigger_at={}",
            request.trigger_at
        );
        Ok(handle)
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<(), GatewayError> {
        let removed = self.lock().scheduled.remove(handle).is_some();
        debug!("event=notification_cancel module=notify status=ok handle={handle} removed={removed}");
        Ok(())
    }

    fn present_now(
        &self,
        title: &str,
        body: &str,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if !state.permission_granted {
            return Err(GatewayError::NoPermission);
        }
        state.presented.push(PresentedNotification {
            title: title.to_string(),
            body: body.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryNotificationGateway;
    use crate::clock::{FixedClock, HOUR_MS};
    use crate::notify::{
        GatewayError, NotificationGateway, NotificationHandle, NotificationPayload,
        NotificationRequest,
    };
    use uuid::Uuid;

    fn request(trigger_at: i64) -> NotificationRequest {
        NotificationRequest {
            title: "Task Reminder".to_string(),
            body: "water plants".to_string(),
            trigger_at,
            payload: NotificationPayload {
                task_id: Uuid::new_v4(),
                task_title: "water plants".to_string(),
            },
        }
    }

    #[test]
    fn schedule_rejects_past_trigger_and_missing_permission() {
        let gateway = InMemoryNotificationGateway::new(FixedClock::new(1_000));
        assert_eq!(
            gateway.schedule_at(&request(1_000)).unwrap_err(),
            GatewayError::PastTime { trigger_at: 1_000 }
        );

        gateway.set_permission_granted(false);
        assert_eq!(
            gateway.schedule_at(&request(1_000 + HOUR_MS)).unwrap_err(),
            GatewayError::NoPermission
        );
        assert!(gateway.outstanding_handles().is_empty());
    }

    #[test]
    fn cancel_is_idempotent_for_unknown_handles() {
        let gateway = InMemoryNotificationGateway::new(FixedClock::new(0));
        let handle = gateway.schedule_at(&request(HOUR_MS)).unwrap();

        gateway.cancel(&handle).unwrap();
        gateway.cancel(&handle).unwrap();
        gateway
            .cancel(&NotificationHandle::new("never-issued"))
            .unwrap();
        assert!(!gateway.is_scheduled(&handle));
    }

    #[test]
    fn take_presented_drains_the_list() {
        let gateway = InMemoryNotificationGateway::new(FixedClock::new(0));
        let payload = request(HOUR_MS).payload;
        gateway.present_now("Upcoming Reminder", "first", &payload).unwrap();
        gateway.present_now("Upcoming Reminder", "second", &payload).unwrap();

        let bodies: Vec<String> = gateway
            .take_presented()
            .into_iter()
            .map(|notification| notification.body)
            .collect();
        assert_eq!(bodies, ["first", "second"]);
        assert!(gateway.presented().is_empty());
        assert!(gateway.take_presented().is_empty());

        gateway.present_now("Upcoming Reminder", "third", &payload).unwrap();
        assert_eq!(gateway.take_presented().len(), 1);
    }

    #[test]
    fn take_due_drains_only_elapsed_notifications() {
        let gateway = InMemoryNotificationGateway::new(FixedClock::new(0));
        let later = gateway.schedule_at(&request(3 * HOUR_MS)).unwrap();
        let sooner = gateway.schedule_at(&request(HOUR_MS)).unwrap();

        let due = gateway.take_due(2 * HOUR_MS);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, sooner);
        assert_eq!(gateway.outstanding_handles(), vec![later]);
    }
}
