//! Background poll for the upcoming-reminder heads-up.
//!
//! # Responsibility
//! - Run `UpcomingWatch::poll` for one task on a fixed cadence.
//! - Present newly surfaced reminders through the notification gateway.
//!
//! # Invariants
//! - The first tick runs immediately after spawn.
//! - The next tick is scheduled only after the previous one returned, so
//!   ticks never overlap or stack up.
//! - Stopping (explicitly or by drop) wakes the worker and joins it.
//! - The poll is read-only with respect to reminder storage.

use crate::clock::{Clock, EpochMs};
use crate::model::reminder::Reminder;
use crate::model::task::TaskId;
use crate::notify::NotificationGateway;
use crate::reminder::upcoming::{present_heads_up, UpcomingWatch};
use crate::repo::task_repo::RepoResult;
use log::{debug, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLLER_THREAD_NAME: &str = "lazytask-upcoming-poll";

/// Supplies the current reminders of the watched task on each tick.
pub trait ReminderSource {
    fn reminders(&mut self) -> RepoResult<Vec<Reminder>>;
}

impl<F> ReminderSource for F
where
    F: FnMut() -> RepoResult<Vec<Reminder>>,
{
    fn reminders(&mut self) -> RepoResult<Vec<Reminder>> {
        self()
    }
}

/// Task whose reminders are watched.
#[derive(Debug, Clone)]
pub struct WatchedTask {
    pub task_id: TaskId,
    pub title: String,
}

/// Handle to a running poll thread. Dropping it stops the thread.
pub struct UpcomingPoller {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl UpcomingPoller {
    /// Spawns the poll thread.
    ///
    /// # Errors
    /// Returns the OS error when the thread cannot be spawned.
    pub fn spawn<R, G, C>(
        task: WatchedTask,
        source: R,
        gateway: G,
        clock: C,
        interval: Duration,
        window: EpochMs,
    ) -> std::io::Result<Self>
    where
        R: ReminderSource + Send + 'static,
        G: NotificationGateway + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name(POLLER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut source = source;
                let mut watch = UpcomingWatch::new(window);
                info!(
                    "event=upcoming_poll_start module=reminder status=ok task_id={} interval_ms={}",
                    task.task_id,
                    interval.as_millis()
                );
                loop {
                    run_tick(&task, &mut source, &gateway, &clock, &mut watch);
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!(
                    "event=upcoming_poll_stop module=reminder status=ok task_id={}",
                    task.task_id
                );
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Stops the poll thread and waits for the in-flight tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // A send error means the worker already exited.
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=upcoming_poll_stop module=reminder status=error reason=worker_panicked");
            }
        }
    }
}

impl Drop for UpcomingPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_tick<R, G, C>(
    task: &WatchedTask,
    source: &mut R,
    gateway: &G,
    clock: &C,
    watch: &mut UpcomingWatch,
) where
    R: ReminderSource,
    G: NotificationGateway,
    C: Clock,
{
    let reminders = match source.reminders() {
        Ok(reminders) => reminders,
        Err(err) => {
            warn!(
                "event=upcoming_poll_tick module=reminder status=error task_id={} stage=source error={err}",
                task.task_id
            );
            return;
        }
    };

    let Some(reminder) = watch.poll(&reminders, clock.now_ms()) else {
        debug!(
            "event=upcoming_poll_tick module=reminder status=ok task_id={} surfaced=false",
            task.task_id
        );
        return;
    };

    match present_heads_up(gateway, task.task_id, &task.title, reminder) {
        Ok(()) => info!(
            "event=upcoming_poll_tick module=reminder status=ok task_id={} surfaced=true reminder_id={}",
            task.task_id, reminder.id
        ),
        Err(err) => warn!(
            "event=upcoming_poll_tick module=reminder status=error task_id={} stage=present error={err}",
            task.task_id
        ),
    }
}
